//! Payment handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Money, PaymentId};
use domain_billing::payment::{PaymentMethod, PaymentStatus, PaymentType};
use domain_billing::ports::{PaymentFilter, PaymentStore};
use domain_settlement::request::PaymentRequest;

use crate::dto::payments::*;
use crate::{error::ApiError, AppState};

/// Submits a payment (tenant side)
pub async fn submit_payment(
    State(state): State<AppState>,
    Json(request): Json<SubmitPaymentRequest>,
) -> Result<Json<SubmitPaymentResponse>, ApiError> {
    request.validate()?;

    let domain_request = build_payment_request(&request)?;
    let outcome = state.engine.submit_payment(domain_request).await?;

    Ok(Json(SubmitPaymentResponse {
        success: true,
        data: PaymentResponse::from(&outcome.payment),
        coupon: outcome.coupon.as_ref().map(Into::into),
        needs_confirmation: outcome.needs_confirmation,
        message: outcome.message,
    }))
}

/// Lists payments
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentQuery>,
) -> Result<Json<PaymentListResponse>, ApiError> {
    let filter = PaymentFilter {
        tenant_id: query.tenant_id.map(Into::into),
        bill_id: query.bill_id.map(Into::into),
        payment_type: query
            .payment_type
            .as_deref()
            .map(parse_payment_type)
            .transpose()?,
        status: query.status.as_deref().map(parse_status).transpose()?,
    };

    let payments = state.payments.list(filter).await?;

    Ok(Json(PaymentListResponse {
        success: true,
        data: payments.iter().map(Into::into).collect(),
    }))
}

/// Lists payments awaiting confirmation (merchant side)
pub async fn pending_payments(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<PaymentListResponse>, ApiError> {
    if !state.approvers.is_authorized(&query.admin_phone) {
        return Err(ApiError::Forbidden(format!(
            "{} is not an approver",
            query.admin_phone
        )));
    }

    let payments = state
        .payments
        .list(PaymentFilter::by_status(PaymentStatus::Pending))
        .await?;

    Ok(Json(PaymentListResponse {
        success: true,
        data: payments.iter().map(Into::into).collect(),
    }))
}

/// Confirms a pending payment (merchant side)
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolvePaymentRequest>,
) -> Result<Json<ResolvePaymentResponse>, ApiError> {
    request.validate()?;

    let outcome = state
        .gate
        .confirm_payment(PaymentId::from(id), &request.admin_phone)
        .await?;

    Ok(Json(ResolvePaymentResponse::confirmed(
        outcome.coupon.as_ref(),
    )))
}

/// Rejects a pending payment (merchant side)
pub async fn reject_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolvePaymentRequest>,
) -> Result<Json<ResolvePaymentResponse>, ApiError> {
    request.validate()?;

    state
        .gate
        .reject_payment(
            PaymentId::from(id),
            &request.admin_phone,
            request.reason.as_deref(),
        )
        .await?;

    Ok(Json(ResolvePaymentResponse::rejected()))
}

/// Builds the typed domain request from the wire shape
///
/// Bill-backed types must name their bill; deposits and refunds must not
/// reference one.
fn build_payment_request(request: &SubmitPaymentRequest) -> Result<PaymentRequest, ApiError> {
    let tenant_id = request.tenant_id.into();
    let amount = Money::cny(request.amount);
    let method = request
        .payment_method
        .as_deref()
        .map(parse_method)
        .transpose()?
        .unwrap_or_default();

    let bill_id = |payment_type: &str| {
        request
            .bill_id
            .map(Into::into)
            .ok_or_else(|| {
                ApiError::Validation(format!("bill_id is required for {} payments", payment_type))
            })
    };

    match request.payment_type.as_str() {
        "rent" => Ok(PaymentRequest::Rent {
            tenant_id,
            bill_id: bill_id("rent")?,
            amount,
            method,
        }),
        "electricity" => Ok(PaymentRequest::Electricity {
            tenant_id,
            bill_id: bill_id("electricity")?,
            amount,
            method,
        }),
        "water" => Ok(PaymentRequest::Water {
            tenant_id,
            bill_id: bill_id("water")?,
            amount,
            method,
        }),
        "deposit" => Ok(PaymentRequest::Deposit {
            tenant_id,
            amount,
            method,
        }),
        "refund" => Ok(PaymentRequest::Refund {
            tenant_id,
            amount,
            method,
        }),
        other => Err(ApiError::Validation(format!(
            "unknown payment type '{}'",
            other
        ))),
    }
}

fn parse_payment_type(value: &str) -> Result<PaymentType, ApiError> {
    match value {
        "rent" => Ok(PaymentType::Rent),
        "electricity" => Ok(PaymentType::Electricity),
        "water" => Ok(PaymentType::Water),
        "deposit" => Ok(PaymentType::Deposit),
        "refund" => Ok(PaymentType::Refund),
        other => Err(ApiError::Validation(format!(
            "unknown payment type '{}'",
            other
        ))),
    }
}

fn parse_status(value: &str) -> Result<PaymentStatus, ApiError> {
    match value {
        "pending" => Ok(PaymentStatus::Pending),
        "completed" => Ok(PaymentStatus::Completed),
        "rejected" => Ok(PaymentStatus::Rejected),
        other => Err(ApiError::Validation(format!(
            "unknown payment status '{}'",
            other
        ))),
    }
}

fn parse_method(value: &str) -> Result<PaymentMethod, ApiError> {
    match value {
        "wechat" => Ok(PaymentMethod::Wechat),
        "alipay" => Ok(PaymentMethod::Alipay),
        "cash" => Ok(PaymentMethod::Cash),
        "bank_transfer" => Ok(PaymentMethod::BankTransfer),
        other => Err(ApiError::Validation(format!(
            "unknown payment method '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_request(payment_type: &str, bill_id: Option<Uuid>) -> SubmitPaymentRequest {
        SubmitPaymentRequest {
            tenant_id: Uuid::new_v4(),
            bill_id,
            amount: dec!(300),
            payment_type: payment_type.to_string(),
            payment_method: None,
            transaction_id: None,
        }
    }

    #[test]
    fn test_bill_backed_type_requires_bill_id() {
        let result = build_payment_request(&base_request("electricity", None));
        assert!(matches!(result, Err(ApiError::Validation(_))));

        let result = build_payment_request(&base_request("electricity", Some(Uuid::new_v4())));
        assert!(matches!(result, Ok(PaymentRequest::Electricity { .. })));
    }

    #[test]
    fn test_deposit_ignores_bill_id() {
        let result = build_payment_request(&base_request("deposit", None));
        assert!(matches!(result, Ok(PaymentRequest::Deposit { .. })));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = build_payment_request(&base_request("gas", None));
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_method_defaults_to_wechat() {
        let request = build_payment_request(&base_request("deposit", None)).unwrap();
        assert_eq!(request.method(), PaymentMethod::Wechat);
    }
}
