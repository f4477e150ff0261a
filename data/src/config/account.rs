use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Account {
    /// The account login, `nickname@server`.
    #[serde(skip)]
    pub login: String,
    /// The name used to log in to AuthServ-style services. Defaults to the
    /// nickname part of the login.
    pub auth_name: Option<String>,
    /// The password sent to the network's identity service.
    pub nick_password: Option<String>,
    /// The password used to gain IRC operator status.
    pub oper_password: Option<String>,
    /// Whether to kill a ghost holding the nickname before identifying.
    #[serde(default)]
    pub disconnect_ghosts: bool,
}

impl Account {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            ..Self::default()
        }
    }

    /// The part of the login before `@`.
    pub fn nickname(&self) -> &str {
        self.login
            .split_once('@')
            .map_or(self.login.as_str(), |(nickname, _)| nickname)
    }

    pub fn auth_name(&self) -> Option<&str> {
        non_empty(self.auth_name.as_deref())
            .or_else(|| non_empty(Some(self.nickname())))
    }

    pub fn nick_password(&self) -> Option<&str> {
        non_empty(self.nick_password.as_deref())
    }

    pub fn oper_password(&self) -> Option<&str> {
        non_empty(self.oper_password.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
