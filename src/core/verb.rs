use std::fmt;

/// The five calls a graph node can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Route,
    SendFeedback,
    TransformInput,
    TransformOutput,
    Aggregate,
}

impl Verb {
    pub const ALL: [Verb; 5] = [
        Verb::Route,
        Verb::SendFeedback,
        Verb::TransformInput,
        Verb::TransformOutput,
        Verb::Aggregate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Route => "route",
            Verb::SendFeedback => "send-feedback",
            Verb::TransformInput => "transform-input",
            Verb::TransformOutput => "transform-output",
            Verb::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('_', "-");
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| format!("Unknown verb: {}", s))
    }
}
