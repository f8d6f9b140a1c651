//! Assignment approval and bonus payment.
//!
//! API rejections are returned as outcomes carrying the raw [`Response`] so a
//! batch can keep going; only transport and decoding failures are errors.

use mturk_requester::{Node, Requester, RequesterError, Response};
use thiserror::Error;
use tracing::{error, info};

pub const BONUS_REASON: &str = "Performance bonus";
pub const CURRENCY_CODE: &str = "USD";

#[derive(Error, Debug)]
pub enum CompensatorError {
    #[error(transparent)]
    Requester(#[from] RequesterError),

    /// A field needed to interpret the response was missing or malformed
    #[error("{operation} response has no usable {field}")]
    UnexpectedResponse {
        operation: &'static str,
        field: &'static str,
        response: Box<Response>,
    },
}

pub type CompensatorResult<T> = Result<T, CompensatorError>;

/// Result of [`Compensator::get_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLookup {
    /// `AssignmentStatus`, e.g. Submitted, Approved, Rejected
    Status(String),
    /// No status in the response; the raw response is kept for inspection.
    Unrecognized(Response),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved,
    /// Remote state was already `Approved`.
    AlreadyApproved,
    Rejected(Response),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BonusOutcome {
    Granted,
    /// A bonus already exists for the assignment and `repeat` was false.
    Skipped,
    Rejected(Response),
}

impl ApprovalOutcome {
    /// The error response, if the approval was rejected.
    pub fn rejection(self) -> Option<Response> {
        match self {
            Self::Rejected(response) => Some(response),
            Self::Approved | Self::AlreadyApproved => None,
        }
    }
}

impl BonusOutcome {
    /// The error response, if the grant was rejected.
    pub fn rejection(self) -> Option<Response> {
        match self {
            Self::Rejected(response) => Some(response),
            Self::Granted | Self::Skipped => None,
        }
    }
}

/// Approves assignments and grants bonuses.
pub struct Compensator {
    requester: Requester,
}

impl Compensator {
    pub fn new(requester: Requester) -> Self {
        Self { requester }
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    /// Current assignment status, or the raw response when none is present.
    pub fn get_status(&self, assignment_id: &str) -> CompensatorResult<StatusLookup> {
        let response = self
            .requester
            .request("GetAssignment", [("AssignmentId", Node::from(assignment_id))])?;
        Ok(match response.lookup_str("AssignmentStatus") {
            Some(status) if !status.is_empty() => StatusLookup::Status(status.to_string()),
            _ => StatusLookup::Unrecognized(response),
        })
    }

    /// Amount of the first bonus already paid for the assignment, if any.
    pub fn get_bonus(&self, assignment_id: &str) -> CompensatorResult<Option<f64>> {
        let response = self.bonus_payments(assignment_id)?;
        if bonus_count(&response)? == 0 {
            return Ok(None);
        }
        let amount = response
            .lookup_str("Amount")
            .and_then(|a| a.trim().parse::<f64>().ok());
        match amount {
            Some(amount) => Ok(Some(amount)),
            None => Err(unexpected("GetBonusPayments", "Amount", response)),
        }
    }

    /// Approve an assignment. Already-approved assignments count as success.
    pub fn approve(&self, assignment_id: &str) -> CompensatorResult<ApprovalOutcome> {
        let response = self
            .requester
            .request("ApproveAssignment", [("AssignmentId", Node::from(assignment_id))])?;

        if response.valid {
            info!(assignment_id, "Approved assignment");
            Ok(ApprovalOutcome::Approved)
        } else if response.lookup_str("CurrentState") == Some("Approved") {
            info!(assignment_id, "Already approved");
            Ok(ApprovalOutcome::AlreadyApproved)
        } else {
            error!(
                assignment_id,
                api_message = response.error_message().unwrap_or("<none>"),
                "Error approving assignment"
            );
            Ok(ApprovalOutcome::Rejected(response))
        }
    }

    /// Grant a bonus for an assignment.
    ///
    /// Unless `repeat` is set, an assignment that already has a bonus is
    /// skipped without issuing a grant.
    pub fn grant_bonus(
        &self,
        worker_id: &str,
        assignment_id: &str,
        amount: f64,
        repeat: bool,
    ) -> CompensatorResult<BonusOutcome> {
        if !repeat {
            let previous = self.bonus_payments(assignment_id)?;
            if bonus_count(&previous)? > 0 {
                info!(worker_id, assignment_id, "Skipping previously bonused worker");
                return Ok(BonusOutcome::Skipped);
            }
        }

        let amount_text = format_amount(amount);
        let response = self.requester.request(
            "GrantBonus",
            [
                ("WorkerId", Node::from(worker_id)),
                ("AssignmentId", Node::from(assignment_id)),
                (
                    "BonusAmount",
                    Node::mapping([
                        ("Amount", amount_text.as_str()),
                        ("CurrencyCode", CURRENCY_CODE),
                    ]),
                ),
                ("Reason", Node::from(BONUS_REASON)),
            ],
        )?;

        if response.valid {
            info!(worker_id, amount = %amount_text, "Bonused worker");
            Ok(BonusOutcome::Granted)
        } else {
            error!(
                worker_id,
                assignment_id,
                amount = %amount_text,
                api_message = response.error_message().unwrap_or("<none>"),
                "Error granting bonus"
            );
            Ok(BonusOutcome::Rejected(response))
        }
    }

    fn bonus_payments(&self, assignment_id: &str) -> CompensatorResult<Response> {
        Ok(self
            .requester
            .request("GetBonusPayments", [("AssignmentId", Node::from(assignment_id))])?)
    }
}

fn bonus_count(response: &Response) -> CompensatorResult<u64> {
    response
        .lookup_str("NumResults")
        .and_then(|n| n.trim().parse::<u64>().ok())
        .ok_or_else(|| unexpected("GetBonusPayments", "NumResults", response.clone()))
}

fn unexpected(operation: &'static str, field: &'static str, response: Response) -> CompensatorError {
    CompensatorError::UnexpectedResponse {
        operation,
        field,
        response: Box::new(response),
    }
}

/// Dollar amount with two decimals, as the API expects.
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}
