//! Translation of control commands across user boundaries

use std::fmt;

/// A program plus its arguments, ready to hand to a process spawner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Rewrites commands so they run as the instance owner
///
/// The agent is the process issuing control commands. When it runs as a
/// different user than the instance, the command is wrapped in `sudo`
/// (unprivileged agent) or `su` (root agent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConverter {
    pub agent_user: String,
    pub agent_is_root: bool,
    /// False on platforms without per-user process separation
    pub privilege_separation: bool,
}

impl CommandConverter {
    #[must_use]
    pub fn new(agent_user: impl Into<String>, agent_is_root: bool) -> Self {
        Self {
            agent_user: agent_user.into(),
            agent_is_root,
            privilege_separation: true,
        }
    }

    #[must_use]
    pub fn without_privilege_separation(mut self) -> Self {
        self.privilege_separation = false;
        self
    }

    #[must_use]
    pub fn convert(&self, target_user: &str, command: &str, args: &[&str]) -> CommandLine {
        if !self.privilege_separation || target_user == self.agent_user {
            return CommandLine::new(command, args.iter().copied());
        }

        if self.agent_is_root {
            if target_user == "root" {
                return CommandLine::new(command, args.iter().copied());
            }
            let joined = std::iter::once(command)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            tracing::debug!(target_user, "wrapping command in su");
            return CommandLine::new("su", [target_user, "-c", joined.as_str()]);
        }

        tracing::debug!(target_user, "wrapping command in sudo");
        let mut wrapped = vec!["-n", "-u", target_user, command];
        wrapped.extend_from_slice(args);
        CommandLine::new("sudo", wrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STARTUP: &str = "/opt/tomcat/bin/catalina.sh";

    #[test]
    fn unprivileged_agent_uses_sudo() {
        let converter = CommandConverter::new("agent", false);
        let line = converter.convert("tomcat", STARTUP, &["start"]);
        assert_eq!(line, CommandLine::new("sudo", ["-n", "-u", "tomcat", STARTUP, "start"]));
        assert_eq!(line.to_string(), "sudo -n -u tomcat /opt/tomcat/bin/catalina.sh start");
    }

    #[test]
    fn root_agent_uses_su_with_joined_command() {
        let converter = CommandConverter::new("root", true);
        let line = converter.convert("tomcat", STARTUP, &["stop", "30"]);
        assert_eq!(
            line,
            CommandLine::new("su", ["tomcat", "-c", "/opt/tomcat/bin/catalina.sh stop 30"])
        );
        assert_eq!(line.to_string(), "su tomcat -c \"/opt/tomcat/bin/catalina.sh stop 30\"");
    }

    #[test]
    fn same_user_is_unchanged() {
        let converter = CommandConverter::new("tomcat", false);
        assert_eq!(
            converter.convert("tomcat", STARTUP, &["start"]),
            CommandLine::new(STARTUP, ["start"])
        );
    }

    #[test]
    fn root_target_from_root_agent_is_unchanged() {
        let converter = CommandConverter::new("admin", true);
        assert_eq!(
            converter.convert("root", STARTUP, &[]),
            CommandLine::new(STARTUP, Vec::<String>::new())
        );
    }

    #[test]
    fn no_privilege_separation_is_unchanged() {
        let converter = CommandConverter::new("agent", false).without_privilege_separation();
        assert_eq!(
            converter.convert("tomcat", STARTUP, &["start"]),
            CommandLine::new(STARTUP, ["start"])
        );
    }
}
