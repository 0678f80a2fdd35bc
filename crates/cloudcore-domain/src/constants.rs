use std::time::Duration;

/// Nominal Site → Cloud inventory reporting cadence (§4.1, §9). Not pinned by
/// a specific value in the spec; fixed here at 5 minutes, matching the
/// Site-Agent heartbeat cadence used elsewhere in this corpus.
pub const INVENTORY_RECEIPT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Recent-mutation guard margin added on top of [`INVENTORY_RECEIPT_INTERVAL`]
/// (§4.1: "do not back-transition fresher state").
pub const RECENT_MUTATION_GUARD_MARGIN: Duration = Duration::from_secs(5);

/// DAO-layer guard against unbounded per-Site loads (§9). Exceeding it is a
/// `Transient` store error so the caller can paginate the reconcile call.
pub const TOTAL_LIMIT: i64 = 10_000;

/// First and last IP of a subnet are reserved and never handed out by IPAM (§6).
pub const DEFAULT_RESERVED_IP_COUNT: u8 = 2;

/// Minimum TLS version accepted from a Site (§6).
pub const SITE_TLS_MIN_VERSION: &str = "TLS1.2";

/// Default page size used by the workflow client when listing/paginating (§6).
pub const WORKFLOW_CLIENT_DEFAULT_PAGE_SIZE: u32 = 100;

/// How long a Registered Site may go without an inventory report before
/// `MonitorInventoryReceiptForAllSites` treats it as down (§4.5). Not pinned
/// by a specific value in the spec; fixed here at 3 missed receipt intervals.
pub const INVENTORY_STALE_THRESHOLD: Duration = Duration::from_secs(3 * 5 * 60);

/// Renewal window before `registration_token_expiry` in which
/// `CheckOTPExpirationAndRenewForAllSites` requests a fresh OTP (§4.5).
pub const OTP_RENEWAL_WINDOW: Duration = Duration::from_secs(60 * 60);
