use std::fmt;

use dg_parser::rules;

/// Closed table of statement productions understood by the lowering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Say,
    Wait,
    Do,
    Chat,
    Ask,
    Opt,
    Goto,
    Set,
}

impl StatementKind {
    pub const ALL: [StatementKind; 8] = [
        Self::Say,
        Self::Wait,
        Self::Do,
        Self::Chat,
        Self::Ask,
        Self::Opt,
        Self::Goto,
        Self::Set,
    ];

    pub fn from_rule(rule: &str) -> Option<Self> {
        match rule {
            rules::SAY => Some(Self::Say),
            rules::WAIT => Some(Self::Wait),
            rules::DO => Some(Self::Do),
            rules::CHAT => Some(Self::Chat),
            rules::ASK => Some(Self::Ask),
            rules::OPT => Some(Self::Opt),
            rules::GOTO => Some(Self::Goto),
            rules::SET => Some(Self::Set),
            _ => None,
        }
    }

    pub fn rule(self) -> &'static str {
        match self {
            Self::Say => rules::SAY,
            Self::Wait => rules::WAIT,
            Self::Do => rules::DO,
            Self::Chat => rules::CHAT,
            Self::Ask => rules::ASK,
            Self::Opt => rules::OPT,
            Self::Goto => rules::GOTO,
            Self::Set => rules::SET,
        }
    }

    /// Expected argument count; 0 means variadic and unchecked here.
    pub fn expected_args(self) -> usize {
        match self {
            Self::Ask | Self::Opt => 0,
            Self::Say | Self::Wait | Self::Do | Self::Chat | Self::Goto | Self::Set => 1,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Say => "Say",
            Self::Wait => "Wait",
            Self::Do => "Do",
            Self::Chat => "Chat",
            Self::Ask => "Ask",
            Self::Opt => "Opt",
            Self::Goto => "Goto",
            Self::Set => "Set",
        };
        f.write_str(name)
    }
}
