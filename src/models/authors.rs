pub const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
}
