use sqlx::FromRow;

/// Verbs a one-time code may authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeAction {
    Delete,
    Approve,
    ResetPassword,
    ForgotPassword,
}

impl CodeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeAction::Delete => "delete",
            CodeAction::Approve => "approve",
            CodeAction::ResetPassword => "resetPassword",
            CodeAction::ForgotPassword => "forgotPassword",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "delete" => Some(CodeAction::Delete),
            "approve" => Some(CodeAction::Approve),
            "resetPassword" => Some(CodeAction::ResetPassword),
            "forgotPassword" => Some(CodeAction::ForgotPassword),
            _ => None,
        }
    }
}

/// Single-use capability token binding an action set to one resource.
/// Consumption (row deletion) is the exactly-once commit point.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    pub id: String,
    pub actions: Vec<CodeAction>,
    pub resource_id: String,
    /// Millisecond timestamp; the code expires `ttl_ms` after this.
    pub created_at: i64,
}

impl OneTimeCode {
    pub fn permits(&self, action: CodeAction) -> bool {
        self.actions.contains(&action)
    }

    pub fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms - self.created_at >= ttl_ms
    }
}

#[derive(Debug, FromRow)]
pub struct OneTimeCodeRow {
    pub id: String,
    pub actions: String,
    pub resource_id: String,
    pub created_at: i64,
}

impl OneTimeCodeRow {
    pub fn into_code(self) -> OneTimeCode {
        let actions = self
            .actions
            .split(',')
            .filter_map(CodeAction::parse)
            .collect();
        OneTimeCode {
            id: self.id,
            actions,
            resource_id: self.resource_id,
            created_at: self.created_at,
        }
    }
}

pub fn encode_actions(actions: &[CodeAction]) -> String {
    actions
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

// Link builders for the mails. The paths must round-trip unchanged through
// the consume endpoints, so they are kept in one place.

pub fn comment_action_url(server_url: &str, action: CodeAction, code_id: &str, resource_id: &str) -> String {
    format!("{}/api/comments/{}/{}/{}", server_url, action.as_str(), code_id, resource_id)
}

pub fn event_action_url(server_url: &str, action: CodeAction, code_id: &str, resource_id: &str) -> String {
    format!("{}/api/events/reportAction/{}/{}/{}", server_url, action.as_str(), code_id, resource_id)
}

pub fn password_action_url(server_url: &str, action: CodeAction, code_id: &str, resource_id: &str) -> String {
    format!("{}/api/users/passwordAction/{}/{}/{}", server_url, action.as_str(), code_id, resource_id)
}
