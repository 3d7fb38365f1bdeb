pub mod manager;
pub mod postgres;
pub mod sqlite;

pub use manager::{DatabaseManager, DatabasePool, DatabaseType};
pub use postgres::{PostgresClientLogRepository, PostgresConfigurationRepository, PostgresFeedbackRepository};
pub use sqlite::{SqliteClientLogRepository, SqliteConfigurationRepository, SqliteFeedbackRepository};

/// 构造子串匹配的 LIKE 模式，转义 `\`、`%`、`_`，配合 `ESCAPE '\'` 使用
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
