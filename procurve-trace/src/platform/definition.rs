//! Platform definition for vendor-specific CLI conventions.

use regex::bytes::Regex;

/// Platform definition containing the CLI conventions the driver relies on.
///
/// Privilege is not inferred from the prompt on this platform (ProCurve
/// shows `#` for both Manager and Superuser), so a single prompt pattern
/// is enough to delimit command output.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "hp_procurve").
    pub name: String,

    /// Pattern matching the CLI prompt at the end of command output.
    pub prompt: Regex,

    /// Banner shown before the first prompt that needs a keypress.
    pub continue_prompt: Option<Regex>,

    /// Prompt for the username during `enable`.
    pub username_prompt: Regex,

    /// Prompt for the password during `enable`.
    pub password_prompt: Regex,

    /// Marker the device prints for commands it does not recognize.
    pub not_recognized: String,

    /// Patterns that indicate command failure.
    pub failed_when_contains: Vec<String>,

    /// Patterns that indicate a lookup found nothing.
    pub not_found_markers: Vec<String>,

    /// Interface name prefix of link-aggregation (trunk) ports.
    pub aggregate_prefix: String,

    /// LACP member states counted as active.
    pub active_member_states: Vec<String>,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>, prompt: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            prompt: Regex::new(prompt)?,
            continue_prompt: None,
            username_prompt: Regex::new(r"(?i)username:\s*$")?,
            password_prompt: Regex::new(r"(?i)password:\s*$")?,
            not_recognized: "Invalid input".to_string(),
            failed_when_contains: vec![],
            not_found_markers: vec![],
            aggregate_prefix: String::new(),
            active_member_states: vec![],
        })
    }

    /// Set the pre-login banner pattern.
    pub fn with_continue_prompt(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.continue_prompt = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Set the `enable` credential prompts.
    pub fn with_credential_prompts(mut self, username: &str, password: &str) -> Result<Self, regex::Error> {
        self.username_prompt = Regex::new(username)?;
        self.password_prompt = Regex::new(password)?;
        Ok(self)
    }

    /// Set the "not recognized" marker. It is also a failure pattern.
    pub fn with_not_recognized(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if !self.failed_when_contains.contains(&marker) {
            self.failed_when_contains.push(marker.clone());
        }
        self.not_recognized = marker;
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add a not-found pattern.
    pub fn with_not_found_marker(mut self, pattern: impl Into<String>) -> Self {
        self.not_found_markers.push(pattern.into());
        self
    }

    /// Set the trunk interface prefix.
    pub fn with_aggregate_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.aggregate_prefix = prefix.into();
        self
    }

    /// Add an LACP state counted as active.
    pub fn with_active_member_state(mut self, state: impl Into<String>) -> Self {
        self.active_member_states.push(state.into());
        self
    }

    /// First failure pattern contained in `output`, if any.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|p| output.contains(p.as_str()))
            .map(String::as_str)
    }

    /// Whether the output carries the "not recognized" marker.
    pub fn is_not_recognized(&self, output: &str) -> bool {
        output.contains(&self.not_recognized)
    }

    /// Whether the output says the lookup found nothing.
    pub fn is_not_found(&self, output: &str) -> bool {
        let lower = output.to_lowercase();
        self.not_found_markers
            .iter()
            .any(|m| lower.contains(&m.to_lowercase()))
    }

    /// Whether `interface` names a trunk, e.g. `Trk1`.
    pub fn is_aggregate(&self, interface: &str) -> bool {
        let prefix = self.aggregate_prefix.as_str();
        if prefix.is_empty() || interface.len() <= prefix.len() {
            return false;
        }
        let (head, tail) = interface.split_at(prefix.len());
        head.eq_ignore_ascii_case(prefix) && tail.bytes().all(|b| b.is_ascii_digit())
    }

    /// Whether an LACP member state counts as active.
    pub fn is_active_member_state(&self, state: &str) -> bool {
        self.active_member_states
            .iter()
            .any(|s| s.eq_ignore_ascii_case(state))
    }

    /// Strip the command echo and trailing prompt from raw output.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let text = raw.replace('\r', "");

        let mut lines: Vec<&str> = text.lines().collect();

        // Command echo: the first non-empty line ends with the command
        if let Some(pos) = lines.iter().position(|l| !l.trim().is_empty()) {
            if !command.is_empty() && lines[pos].trim_end().ends_with(command) {
                lines.drain(..=pos);
            }
        }

        // Trailing prompt
        if let Some(last) = lines.last() {
            if self.prompt.is_match(last.as_bytes()) {
                lines.pop();
            }
        }

        lines.join("\n")
    }
}
