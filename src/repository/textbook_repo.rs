// ==========================================
// 教材管理系统 - 教材文档仓储
// ==========================================
// 红线: Repository 不含业务逻辑 (旧数据迁移/派生计算都在引擎层)
// 红线: 只存原始字段,派生字段从不落库
// ==========================================
// 接口: 全量读取 / 按 isbn 整体覆盖 / 按 isbn 删除
// 存储: textbook_document 表 (isbn 主键 + JSON 文档)
// ==========================================

use crate::db::configure_sqlite_connection;
use crate::domain::textbook::TextbookDocument;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// TextbookStore - 持久化协作方接口
// ==========================================
pub trait TextbookStore: Send + Sync {
    /// 读取全部原始文档 (按 isbn 升序)
    fn fetch_all(&self) -> RepositoryResult<Vec<TextbookDocument>>;

    /// 按 isbn 读取
    fn find_by_isbn(&self, isbn: &str) -> RepositoryResult<Option<TextbookDocument>>;

    /// 按 isbn 整体覆盖写入 (不做字段合并,后写覆盖先写)
    fn upsert(&self, doc: &TextbookDocument) -> RepositoryResult<()>;

    /// 按 isbn 删除
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 记录不存在
    fn delete(&self, isbn: &str) -> RepositoryResult<bool>;
}

// ==========================================
// SqliteTextbookStore - SQLite 文档存储
// ==========================================
pub struct SqliteTextbookStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTextbookStore {
    /// 创建新的 SqliteTextbookStore 实例
    ///
    /// 打开失败返回 DatabaseConnectionError
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = Connection::open(db_path).map_err(|e| {
            RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path, e))
        })?;
        configure_sqlite_connection(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

/// 解析文档; 文档内缺少 isbn 时以行主键补齐
fn decode_document(isbn: &str, json: &str) -> RepositoryResult<TextbookDocument> {
    let mut doc: TextbookDocument =
        serde_json::from_str(json).map_err(|e| RepositoryError::DocumentFormatError {
            isbn: isbn.to_string(),
            message: e.to_string(),
        })?;
    if doc.isbn.trim().is_empty() {
        doc.isbn = isbn.to_string();
    }
    Ok(doc)
}

impl TextbookStore for SqliteTextbookStore {
    fn fetch_all(&self) -> RepositoryResult<Vec<TextbookDocument>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT isbn, document FROM textbook_document ORDER BY isbn ASC")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|(isbn, json)| decode_document(isbn, json))
            .collect()
    }

    fn find_by_isbn(&self, isbn: &str) -> RepositoryResult<Option<TextbookDocument>> {
        let conn = self.get_conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT document FROM textbook_document WHERE isbn = ?1",
                params![isbn],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|json| decode_document(isbn, &json)).transpose()
    }

    fn upsert(&self, doc: &TextbookDocument) -> RepositoryResult<()> {
        let isbn = doc.isbn.trim();
        if isbn.is_empty() {
            return Err(RepositoryError::InternalError(
                "文档缺少 isbn,拒绝写入".to_string(),
            ));
        }

        let json = serde_json::to_string(doc).map_err(|e| RepositoryError::DocumentFormatError {
            isbn: isbn.to_string(),
            message: e.to_string(),
        })?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO textbook_document (isbn, document, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(isbn) DO UPDATE SET document = ?2, updated_at = ?3
            "#,
            params![isbn, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&self, isbn: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM textbook_document WHERE isbn = ?1",
            params![isbn],
        )?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    #[test]
    fn test_open_failure_is_connection_error() {
        let result = SqliteTextbookStore::new("/nonexistent-dir/textbook_forecast.db");
        match result {
            Err(RepositoryError::DatabaseConnectionError(msg)) => {
                assert!(msg.contains("nonexistent-dir"));
            }
            Err(other) => panic!("Expected DatabaseConnectionError, got {:?}", other),
            Ok(_) => panic!("Expected DatabaseConnectionError, got Ok"),
        }
    }

    #[test]
    fn test_upsert_then_fetch() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let store = SqliteTextbookStore::from_connection(Arc::new(Mutex::new(conn)));

        let doc = TextbookDocument {
            isbn: "111".to_string(),
            title: "Green Line 3".to_string(),
            ..Default::default()
        };
        store.upsert(&doc).unwrap();
        store.upsert(&doc).unwrap();

        assert_eq!(store.fetch_all().unwrap(), vec![doc.clone()]);
        assert_eq!(store.find_by_isbn("111").unwrap(), Some(doc));
        assert!(store.delete("111").unwrap());
        assert!(!store.delete("111").unwrap());
    }
}
