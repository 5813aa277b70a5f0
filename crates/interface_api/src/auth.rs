//! Approver authorisation
//!
//! Confirm/reject operations are authorised against a configured allow-list
//! of merchant phone numbers. The list is parsed once at startup and
//! injected into the approval gate; business logic never reads the process
//! environment.

use domain_settlement::approval::AdminAllowList;

use crate::config::ApiConfig;

/// Builds the approver allow-list from configuration
pub fn admin_allow_list(config: &ApiConfig) -> AdminAllowList {
    AdminAllowList::from_csv(&config.admin_phones)
}
