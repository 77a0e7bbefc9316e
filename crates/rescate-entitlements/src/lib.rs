//! Service entitlement engine for Rescate
//!
//! For a subscriber snapshot this crate determines how many services of each
//! kind remain, what consumption state that represents and which alert or
//! billing action follows.
//!
//! # Components
//!
//! - `validation` - Validation gate over the limits panel input (fails closed)
//! - `classifier` - Unlimited / tracked / flexible classification and status
//! - `policy` - Alert generator dispatching on (role, plan subtype)
//! - `facade` - `EntitlementEngine`, the aggregate read operation
//! - `catalog`, `presentation` - Pure lookup tables for the UI
//!
//! Every operation is synchronous and side-effect free: it reads the snapshot
//! passed in and returns derived view data.
//!
//! # UI lookup tables
//!
//! `status_label`, `status_colors_for`, `alert_style` and `action_label` are
//! exported for the portal front end, which renders badges, banners and
//! buttons from the `status`, `type` and `action` fields of the aggregate
//! output. The engine itself only embeds `status_colors` in each classified
//! limit.

pub mod catalog;
pub mod classifier;
pub mod facade;
pub mod policy;
pub mod presentation;
pub mod validation;

pub use classifier::{
    calculate_flexible_limit_status, calculate_limit_status, classify, ClassifiedLimit,
    ConsumptionStatus, FlexibleStatus, LimitDetail, LimitStatus,
};
pub use facade::{EntitlementEngine, EntitlementSummary, LimitStatistics};
pub use policy::{generate_alerts, PolicyKey};
pub use presentation::{
    action_label, alert_style, status_colors, status_colors_for, status_label, AlertStyle,
    StatusColors, StatusKey,
};
pub use validation::{validate_limits_data, LimitsValidationInput, ValidationReport};
