//! 商店查询模块 — 分类、搜索与应用详情

pub mod client;
pub mod payload;
pub mod types;

pub use client::{detail_from_response, parse_category_count, select_category_id, StoreClient};
pub use payload::{build_search_payload, SearchFilters, SearchPayload};
pub use types::{extract_app_items, format_app_list, AppDetail, AppSummary, Category, RawApp};
