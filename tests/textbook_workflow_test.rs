// ==========================================
// 教材工作流集成测试
// ==========================================
// 测试范围:
// 1. 编辑: 模式切换清空旧分布、isbn 不可修改
// 2. 删除: 已删除/不存在
// 3. 汇总: 分组求和、告警子集、过滤
// ==========================================


use textbook_forecast::api::ApiError;
use textbook_forecast::domain::CirculationMode;
use textbook_forecast::engine::{TextbookFilter, STOCK_GROUP};
use test_helpers::*;

// ==========================================
// 编辑
// ==========================================

#[test]
fn test_mode_switch_clears_previous_mapping() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let isbn = "978-3-12-733111-3";

    env.api
        .create_textbook(&double_draft(isbn, &[("5a", 30)], &[("6a", 25)], 3, 40))
        .expect("保存失败");

    // 编辑表单预填后改为 Flexible; 旧的两届分布仍留在表单里
    let mut draft = env.api.edit_draft(isbn).expect("读取失败");
    assert_eq!(draft.cohort1_classes, counts(&[("5a", 30)]));
    draft.mode = "flexible".to_string();
    draft.flex_classes = flex(&[("5a", 10, 4)]);

    let saved = env.api.update_textbook(isbn, &draft).expect("保存失败");
    assert_eq!(saved.record.mode(), CirculationMode::Flexible);
    assert_eq!(saved.forecast.forecast_available, 4);

    let doc = env.raw_document(isbn).expect("读取文档失败");
    assert_eq!(doc["mode"], "flexible");
    assert_eq!(doc["double_cohort"], false);
    assert_eq!(doc["cohort1_classes"], serde_json::json!({}));
    assert_eq!(doc["cohort2_classes"], serde_json::json!({}));
    assert_eq!(doc["circulation_classes"], serde_json::json!({}));
    assert_eq!(doc["flex_classes"]["5a"]["held"], 10);
    assert_eq!(doc["flex_classes"]["5a"]["returning"], 4);

    // 派生字段不落库
    assert!(doc.get("forecast_available").is_none());
    assert!(doc.get("alarm").is_none());
}

#[test]
fn test_update_keeps_isbn_fixed() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.api
        .create_textbook(&single_draft("111", &[("7a", 20)], 0, 10))
        .expect("保存失败");

    let err = env
        .api
        .update_textbook("111", &single_draft("222", &[("7a", 20)], 0, 10))
        .expect_err("isbn 变更必须被拒绝");
    assert!(matches!(err, ApiError::InvalidInput(_)));

    assert!(env.api.get_textbook("111").is_ok());
    assert!(matches!(env.api.get_textbook("222"), Err(ApiError::NotFound(_))));
}

#[test]
fn test_create_overwrites_same_isbn() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.api
        .create_textbook(&single_draft("111", &[("7a", 20)], 0, 10))
        .expect("保存失败");
    env.api
        .create_textbook(&single_draft("111", &[("7b", 12)], 0, 10))
        .expect("保存失败");

    let books = env.api.list_textbooks().expect("读取失败");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].totals.circulating_total, 12);
}

#[test]
fn test_draft_is_normalized_before_saving() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let mut draft = flexible_draft(" 111 ", &[(" 5a ", 8, 3), ("6b", 0, 0)], 0, 0);
    draft.title = "  Diercke Weltatlas ".to_string();

    let saved = env.api.create_textbook(&draft).expect("保存失败");
    assert_eq!(saved.record.isbn, "111");
    assert_eq!(saved.record.title, "Diercke Weltatlas");
    assert!(saved.record.circulation.has_class("5a"));
    assert!(!saved.record.circulation.has_class("6b"));
}

// ==========================================
// 删除
// ==========================================

#[test]
fn test_delete_textbook() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.api
        .create_textbook(&single_draft("111", &[("7a", 20)], 0, 10))
        .expect("保存失败");

    env.api.delete_textbook("111").expect("删除失败");
    assert!(env.api.list_textbooks().expect("读取失败").is_empty());

    let err = env.api.delete_textbook("111").expect_err("重复删除应报错");
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ==========================================
// 汇总
// ==========================================

fn seed(env: &TestEnv) {
    let drafts = vec![
        single_draft("978-3-12-834230-7", &[("7a", 28), ("7b", 27)], 10, 60),
        double_draft("978-3-12-733111-3", &[("5a", 30)], &[("6a", 25)], 3, 40),
        flexible_draft("978-3-14-100800-5", &[("5a", 8, 3), ("6b", 5, 5)], 8, 6),
    ];
    for draft in &drafts {
        env.api.create_textbook(draft).expect("保存失败");
    }
}

#[test]
fn test_inventory_report_totals() {
    let env = TestEnv::new().expect("无法创建测试环境");
    seed(&env);

    let report = env
        .api
        .get_inventory_report(&TextbookFilter::default())
        .expect("生成报表失败");

    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.summary.title_count, 3);
    assert_eq!(report.summary.total_copies, 65 + 58 + 21);
    assert_eq!(report.summary.alarm_count, 1);
    assert_eq!(report.summary.missing_copies, 15);
    assert_eq!(report.reserve_copies, 5);

    assert_eq!(report.alarms.len(), 1);
    assert_eq!(report.alarms[0].isbn, "978-3-12-733111-3");

    // 分组之和 == 全部 grand_total 之和
    let class_sum: u64 = report.totals_by_class.values().sum();
    let subject_sum: u64 = report.totals_by_subject.values().sum();
    assert_eq!(class_sum, report.summary.total_copies);
    assert_eq!(subject_sum, report.summary.total_copies);

    assert_eq!(report.totals_by_class.get("5a"), Some(&38));
    assert_eq!(report.totals_by_class.get(STOCK_GROUP), Some(&21));
    assert_eq!(report.totals_by_subject.get("Mathematik"), Some(&58));
}

#[test]
fn test_inventory_report_filters() {
    let env = TestEnv::new().expect("无法创建测试环境");
    seed(&env);

    let alarms_only = TextbookFilter {
        alarm_only: true,
        ..Default::default()
    };
    let report = env.api.get_inventory_report(&alarms_only).expect("生成报表失败");
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].subject, "Mathematik");

    let by_class = TextbookFilter {
        class: Some("6b".to_string()),
        ..Default::default()
    };
    let books = env.api.search_textbooks(&by_class).expect("查询失败");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].isbn(), "978-3-14-100800-5");

    let by_text = TextbookFilter {
        text: Some("green LINE".to_string()),
        ..Default::default()
    };
    let books = env.api.search_textbooks(&by_text).expect("查询失败");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].isbn(), "978-3-12-834230-7");
}

#[test]
fn test_detail_view_texts() {
    let env = TestEnv::new().expect("无法创建测试环境");
    seed(&env);

    let detail = env
        .api
        .get_textbook_detail("978-3-14-100800-5")
        .expect("读取详情失败");

    assert_eq!(detail.class_breakdown, "5a: 8(3↩), 6b: 5(5↩)");
    assert!(detail.status_message.contains('5'));
    assert!(!detail.mode_label.is_empty());
    assert!(!detail.orderable_label.is_empty());
}
