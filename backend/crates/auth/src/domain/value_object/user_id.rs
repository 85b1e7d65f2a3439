use kernel::id::{Id, markers};

/// Store-assigned user identifier
pub type UserId = Id<markers::User>;
