// ==========================================
// 教材管理系统 - 教材 API
// ==========================================
// 职责: 新建/编辑/删除/列表/详情/汇总工作流
// 流程: 表单 → 校验 (全部违规) → 文档 → 仓储
//       仓储 → 旧数据迁移 → 预测评估 → 汇总
// 红线: 校验失败不触达仓储 (无部分提交)
// 红线: 派生字段每次读取时重算,从不落库
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ForecastConfig;
use crate::domain::forecast::EvaluatedTextbook;
use crate::domain::textbook::{TextbookDocument, TextbookDraft, TextbookRecord};
use crate::engine::forecast::ForecastEvaluator;
use crate::engine::migration::migrate_document;
use crate::engine::report::{
    class_breakdown, ForecastRow, InventoryReporter, InventorySummary, TextbookFilter,
};
use crate::engine::validation::TextbookValidator;
use crate::i18n;
use crate::repository::textbook_repo::TextbookStore;

// ==========================================
// TextbookDetail - 详情视图
// ==========================================
/// 单条教材的详情 (评估结果 + 展示文本)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextbookDetail {
    pub textbook: EvaluatedTextbook,
    pub mode_label: String,
    pub class_breakdown: String,
    pub status_message: String,
    pub orderable_label: String,
}

// ==========================================
// InventoryReport - 汇总报表
// ==========================================
/// 过滤后集合的报表视图,供展示/导出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryReport {
    pub rows: Vec<ForecastRow>,
    pub alarms: Vec<ForecastRow>,
    pub summary: InventorySummary,
    pub totals_by_class: BTreeMap<String, u64>,
    pub totals_by_subject: BTreeMap<String, u64>,
    pub reserve_copies: u32,
}

// ==========================================
// TextbookApi - 教材 API
// ==========================================
pub struct TextbookApi<S: TextbookStore> {
    store: Arc<S>,
    config: ForecastConfig,
    evaluator: ForecastEvaluator,
    validator: TextbookValidator,
    reporter: InventoryReporter,
}

impl<S: TextbookStore> TextbookApi<S> {
    /// 创建新的 TextbookApi 实例
    ///
    /// # 参数
    /// - store: 教材文档仓储
    /// - config: 预测配置 (reserve 与输入辅助目录)
    pub fn new(store: Arc<S>, config: ForecastConfig) -> Self {
        Self {
            evaluator: ForecastEvaluator::new(&config),
            validator: TextbookValidator::new(&config),
            reporter: InventoryReporter::new(),
            store,
            config,
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 新建教材 (同 isbn 已存在时整体覆盖)
    ///
    /// # 返回
    /// - Ok(EvaluatedTextbook): 已保存记录及其派生字段
    /// - Err(ApiError::ValidationFailed): 全部违规,未写入
    pub fn create_textbook(&self, draft: &TextbookDraft) -> ApiResult<EvaluatedTextbook> {
        let record = self.validate_draft(draft)?;
        self.save(record)
    }

    /// 编辑教材
    ///
    /// isbn 为主键,编辑时不可修改
    pub fn update_textbook(
        &self,
        isbn: &str,
        draft: &TextbookDraft,
    ) -> ApiResult<EvaluatedTextbook> {
        let isbn = isbn.trim();
        if isbn.is_empty() {
            return Err(ApiError::InvalidInput("isbn 不能为空".to_string()));
        }
        if draft.isbn.trim() != isbn {
            return Err(ApiError::InvalidInput(format!(
                "isbn 不可修改: {} → {}",
                isbn,
                draft.isbn.trim()
            )));
        }
        if self.store.find_by_isbn(isbn)?.is_none() {
            return Err(ApiError::NotFound(format!("Textbook(isbn={})不存在", isbn)));
        }

        let record = self.validate_draft(draft)?;
        self.save(record)
    }

    /// 删除教材
    pub fn delete_textbook(&self, isbn: &str) -> ApiResult<()> {
        let isbn = isbn.trim();
        if !self.store.delete(isbn)? {
            return Err(ApiError::NotFound(format!("Textbook(isbn={})不存在", isbn)));
        }
        info!(isbn = %isbn, "教材已删除");
        Ok(())
    }

    /// 校验表单 (不写入)
    ///
    /// 收集全部违规后一次性返回,便于逐项提示
    pub fn validate_draft(&self, draft: &TextbookDraft) -> ApiResult<TextbookRecord> {
        let violations = self.validator.violations(draft);
        if !violations.is_empty() {
            warn!(
                isbn = %draft.isbn,
                violation_count = violations.len(),
                "教材表单校验失败"
            );
            return Err(ApiError::from_violations(violations));
        }
        Ok(self.validator.validate(draft)?)
    }

    /// 预览表单的派生字段 (不写入)
    pub fn preview_textbook(&self, draft: &TextbookDraft) -> ApiResult<EvaluatedTextbook> {
        let record = self.validate_draft(draft)?;
        Ok(self.evaluator.evaluate(&record))
    }

    fn save(&self, record: TextbookRecord) -> ApiResult<EvaluatedTextbook> {
        self.store.upsert(&TextbookDocument::from(&record))?;

        let evaluated = self.evaluator.evaluate(&record);
        info!(
            isbn = %record.isbn,
            mode = %record.mode(),
            grand_total = evaluated.totals.grand_total,
            alarm = evaluated.forecast.alarm,
            "教材已保存"
        );
        Ok(evaluated)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 全部教材 (按 isbn 升序,附派生字段)
    pub fn list_textbooks(&self) -> ApiResult<Vec<EvaluatedTextbook>> {
        let documents = self.store.fetch_all()?;
        debug!(count = documents.len(), "读取教材文档");

        Ok(documents
            .into_iter()
            .map(|doc| self.evaluator.evaluate(&migrate_document(doc)))
            .collect())
    }

    /// 按条件过滤的教材列表
    pub fn search_textbooks(&self, filter: &TextbookFilter) -> ApiResult<Vec<EvaluatedTextbook>> {
        let books = self.list_textbooks()?;
        Ok(self.reporter.filter(&books, filter))
    }

    /// 单条教材
    pub fn get_textbook(&self, isbn: &str) -> ApiResult<EvaluatedTextbook> {
        let isbn = isbn.trim();
        let doc = self
            .store
            .find_by_isbn(isbn)?
            .ok_or_else(|| ApiError::NotFound(format!("Textbook(isbn={})不存在", isbn)))?;
        Ok(self.evaluator.evaluate(&migrate_document(doc)))
    }

    /// 单条教材详情 (含本地化状态提示)
    pub fn get_textbook_detail(&self, isbn: &str) -> ApiResult<TextbookDetail> {
        let textbook = self.get_textbook(isbn)?;
        Ok(TextbookDetail {
            mode_label: i18n::mode_label(textbook.record.mode()),
            class_breakdown: class_breakdown(&textbook.record.circulation),
            status_message: i18n::stock_status_message(&textbook),
            orderable_label: i18n::orderable_label(textbook.record.orderable),
            textbook,
        })
    }

    /// 编辑表单预填
    pub fn edit_draft(&self, isbn: &str) -> ApiResult<TextbookDraft> {
        let textbook = self.get_textbook(isbn)?;
        Ok(TextbookDraft::from(&textbook.record))
    }

    /// 汇总报表 (过滤后集合)
    pub fn get_inventory_report(&self, filter: &TextbookFilter) -> ApiResult<InventoryReport> {
        let books = self.search_textbooks(filter)?;

        let rows = self.reporter.rows(&books);
        let alarms: Vec<ForecastRow> = rows.iter().filter(|r| r.alarm).cloned().collect();
        let summary = self.reporter.summary(&books);

        if !alarms.is_empty() {
            warn!(
                alarm_count = alarms.len(),
                missing_copies = summary.missing_copies,
                "存在需要补订的教材"
            );
        }

        Ok(InventoryReport {
            totals_by_class: self.reporter.grand_total_by_class(&books),
            totals_by_subject: self.reporter.grand_total_by_subject(&books),
            reserve_copies: self.evaluator.reserve_copies(),
            rows,
            alarms,
            summary,
        })
    }
}
