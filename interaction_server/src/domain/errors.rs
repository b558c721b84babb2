use std::fmt;

// Failures talking to the live session. None of these are fatal; callers log and move on.
#[derive(Debug)]
pub enum SessionError {
    Transport(String),
    Upstream {
        status: u16,
        message: Option<String>,
    },
    Decode(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Transport(err) => write!(f, "session transport error: {err}"),
            SessionError::Upstream { status, message } => {
                if let Some(message) = message {
                    write!(f, "session upstream error {status}: {message}")
                } else {
                    write!(f, "session upstream error {status}")
                }
            }
            SessionError::Decode(err) => write!(f, "session response decode error: {err}"),
        }
    }
}

impl std::error::Error for SessionError {}
