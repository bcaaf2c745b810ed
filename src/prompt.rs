use console::Term;

/// Source of credentials missing from the configuration.
pub trait Prompt {
    fn login(&mut self) -> String;
    fn password(&mut self) -> String;
}

/// Asks on the controlling terminal. Detached terminals answer with empty values.
pub struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        TerminalPrompt {
            term: Term::stderr(),
        }
    }

    fn ask(&self, label: &str, secure: bool) -> String {
        if !self.term.features().is_attended() {
            return String::new();
        }
        if let Err(err) = self.term.write_str(label) {
            tracing::warn!("Failed to write prompt: {err}");
            return String::new();
        }
        let answer = if secure {
            self.term.read_secure_line()
        } else {
            self.term.read_line()
        };
        answer.unwrap_or_else(|err| {
            tracing::warn!("Failed to read input: {err}");
            String::new()
        })
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompt {
    fn login(&mut self) -> String {
        self.ask("Login: ", false)
    }

    fn password(&mut self) -> String {
        self.ask("Password: ", true)
    }
}

/// Fills in whatever the environment did not provide.
pub fn resolve_credentials(login: &str, password: &str, prompt: &mut impl Prompt) -> (String, String) {
    let mut login = login.trim().to_owned();
    let mut password = password.to_owned();

    if !login.is_empty() && !password.is_empty() {
        return (login, password);
    }

    tracing::info!("Login or password missing; entering interactive mode");
    if login.is_empty() {
        login = prompt.login().trim().to_owned();
    }
    if password.is_empty() {
        password = prompt.password();
    }
    (login, password)
}
