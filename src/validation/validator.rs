use crate::ledger::LedgerEngine;
use crate::registry::DeployRegistry;
use crate::types::{
    Address, CONTENT_TYPE_TBEARS, CONTENT_TYPE_ZIP, DATA_TYPE_CALL, DATA_TYPE_DEPLOY, FIXED_FEE,
    MAX_DATA_SIZE, ValidationError, ZERO_SCORE_ADDRESS, generate_score_address,
};
use crate::validation::request::{RequestV2, RequestV3, TransactionRequest, WireAmount};
use ethers::types::U256;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Transaction admission gate.
///
/// Decides, without causing any mutation, whether a request may enter
/// execution, and surfaces a specific typed rejection otherwise. Balance and
/// registry reads always go through context `None` (latest committed state):
/// admission races against what is already committed, not against any
/// in-flight context.
pub struct PreValidator {
    ledger: Arc<LedgerEngine>,
    deploy_registry: Arc<DeployRegistry>,
}

impl PreValidator {
    pub fn new(ledger: Arc<LedgerEngine>, deploy_registry: Arc<DeployRegistry>) -> Self {
        Self {
            ledger,
            deploy_registry,
        }
    }

    /// Full admission check, dispatched by protocol version.
    ///
    /// Legacy requests first reject a negative `value`, then run the v2
    /// chain. Current-protocol requests first enforce the `data` size cap,
    /// then run the v3 chain with the given step parameters.
    pub async fn execute(
        &self,
        request: &TransactionRequest,
        step_price: U256,
        minimum_step: U256,
    ) -> Result<(), ValidationError> {
        debug!("pre-validating transaction");
        let result = match request {
            TransactionRequest::V2(req) => {
                if matches!(req.value, Some(value) if value.is_negative()) {
                    Err(ValidationError::InvalidParameter("value < 0".to_string()))
                } else {
                    self.validate_transaction_v2(req).await
                }
            }
            TransactionRequest::V3(req) => match self.check_data_size(req.data.as_ref()) {
                Ok(()) => {
                    self.validate_transaction_v3(req, step_price, minimum_step)
                        .await
                }
                Err(err) => Err(err),
            },
        };
        match result {
            Ok(()) => {
                debug!("transaction admitted");
                Ok(())
            }
            Err(err) => {
                warn!(%err, "transaction rejected");
                Err(err)
            }
        }
    }

    /// Affordability-only gate, used to cheaply drop underfunded senders
    /// before spending effort on full validation
    pub async fn execute_to_check_out_of_balance(
        &self,
        request: &TransactionRequest,
        step_price: U256,
    ) -> Result<(), ValidationError> {
        match request {
            TransactionRequest::V2(req) => self.check_from_can_charge_fee_v2(req).await,
            TransactionRequest::V3(req) => {
                self.check_from_can_charge_fee_v3(req, step_price).await
            }
        }
    }

    /// Rejects a v3 `data` payload whose summed character length exceeds
    /// [`MAX_DATA_SIZE`]
    pub(crate) fn check_data_size(&self, data: Option<&Value>) -> Result<(), ValidationError> {
        if let Some(data) = data {
            if character_length(data) > MAX_DATA_SIZE {
                return Err(ValidationError::InvalidRequest(
                    "The data field is too big".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Legacy structural validation. The affordability check runs first, so
    /// its missing-field failures propagate ahead of the `to` checks.
    pub(crate) async fn validate_transaction_v2(
        &self,
        req: &RequestV2,
    ) -> Result<(), ValidationError> {
        self.check_from_can_charge_fee_v2(req).await?;

        let to = req.to.as_ref().ok_or(ValidationError::MissingField("to"))?;
        if to.is_contract() {
            return Err(ValidationError::InvalidRequest(
                "Not allowed to transfer coin to SCORE on protocol v2".to_string(),
            ));
        }
        Ok(())
    }

    /// Legacy affordability: the fee field must equal the protocol's fixed
    /// fee verbatim, then the sender must cover value + fee
    pub(crate) async fn check_from_can_charge_fee_v2(
        &self,
        req: &RequestV2,
    ) -> Result<(), ValidationError> {
        let fee = req.fee.ok_or(ValidationError::MissingField("fee"))?;
        if fee != WireAmount::Unsigned(U256::from(FIXED_FEE)) {
            return Err(ValidationError::InvalidRequest(format!("Invalid fee: {fee}")));
        }

        let from = req
            .from
            .as_ref()
            .ok_or(ValidationError::MissingField("from"))?;
        let value = unsigned_value(req.value)?;
        self.check_balance(from, value, U256::from(FIXED_FEE)).await
    }

    /// Current-protocol structural validation, in protocol order: step
    /// minimum, affordability, target existence, inactive-contract check,
    /// then content validation for call/deploy payloads
    pub(crate) async fn validate_transaction_v3(
        &self,
        req: &RequestV3,
        step_price: U256,
        minimum_step: U256,
    ) -> Result<(), ValidationError> {
        self.check_minimum_step(req, minimum_step)?;
        self.check_from_can_charge_fee_v3(req, step_price).await?;

        let to = req.to.as_ref().ok_or(ValidationError::MissingField("to"))?;
        if self.is_inactive_score(to).await {
            return Err(ValidationError::InvalidRequest(format!(
                "{to} is inactive SCORE"
            )));
        }

        match req.data_type.as_deref() {
            Some(DATA_TYPE_CALL) => self.validate_call_transaction(req).await,
            Some(DATA_TYPE_DEPLOY) => self.validate_deploy_transaction(req).await,
            // Any other dataType, absent included, needs no content checks
            _ => Ok(()),
        }
    }

    /// A v3 request must declare at least the minimum step limit; an absent
    /// stepLimit counts as 0 and fails the same way
    pub(crate) fn check_minimum_step(
        &self,
        req: &RequestV3,
        minimum_step: U256,
    ) -> Result<(), ValidationError> {
        let step_limit = req.step_limit.unwrap_or_default();
        if step_limit < minimum_step {
            return Err(ValidationError::InvalidRequest(
                "Step limit too low".to_string(),
            ));
        }
        Ok(())
    }

    /// Current-protocol affordability: fee = stepLimit * stepPrice
    pub(crate) async fn check_from_can_charge_fee_v3(
        &self,
        req: &RequestV3,
        step_price: U256,
    ) -> Result<(), ValidationError> {
        let from = req
            .from
            .as_ref()
            .ok_or(ValidationError::MissingField("from"))?;
        let value = unsigned_value(req.value)?;

        let step_limit = req.step_limit.unwrap_or_default();
        let fee = step_limit.checked_mul(step_price).ok_or_else(|| {
            ValidationError::InvalidParameter(format!(
                "fee overflow: stepLimit({step_limit}) * stepPrice({step_price})"
            ))
        })?;

        self.check_balance(from, value, fee).await
    }

    pub(crate) async fn validate_call_transaction(
        &self,
        req: &RequestV3,
    ) -> Result<(), ValidationError> {
        let to = req.to.as_ref().ok_or(ValidationError::MissingField("to"))?;
        if self.is_inactive_score(to).await {
            return Err(ValidationError::InvalidRequest(format!(
                "{to} is inactive SCORE"
            )));
        }

        let fields = req
            .data
            .as_ref()
            .and_then(Value::as_object)
            .ok_or_else(|| ValidationError::InvalidRequest("Data not found".to_string()))?;
        if !fields.contains_key("method") {
            return Err(ValidationError::InvalidRequest("Method not found".to_string()));
        }
        Ok(())
    }

    pub(crate) async fn validate_deploy_transaction(
        &self,
        req: &RequestV3,
    ) -> Result<(), ValidationError> {
        let to = req.to.as_ref().ok_or(ValidationError::MissingField("to"))?;
        if self.is_inactive_score(to).await {
            return Err(ValidationError::InvalidRequest(format!(
                "{to} is an inactive SCORE"
            )));
        }

        let fields = req
            .data
            .as_ref()
            .and_then(Value::as_object)
            .ok_or_else(|| ValidationError::InvalidRequest("Data not found".to_string()))?;
        if !fields.contains_key("contentType") {
            return Err(ValidationError::InvalidRequest(
                "ContentType not found".to_string(),
            ));
        }
        if !fields.contains_key("content") {
            return Err(ValidationError::InvalidRequest("Content not found".to_string()));
        }

        self.validate_new_score_address_on_deploy_transaction(req)
            .await
    }

    /// Collision check for install deployments.
    ///
    /// Only installs (deploys targeting the zero contract address) reserve a
    /// new address; updates return immediately. Missing fields discovered
    /// here are parameter-level failures, distinct from the request-level
    /// rejections of the deploy validator above. The derived address is
    /// checked against the *committed* registry state (`None` context),
    /// since a reservation races against already-committed deployments.
    pub(crate) async fn validate_new_score_address_on_deploy_transaction(
        &self,
        req: &RequestV3,
    ) -> Result<(), ValidationError> {
        let to = req.to.as_ref().ok_or(ValidationError::MissingField("to"))?;
        if *to != ZERO_SCORE_ADDRESS {
            return Ok(());
        }

        let data = req.data.as_ref().and_then(Value::as_object).ok_or_else(|| {
            ValidationError::InvalidParameter("Invalid params: 'data'".to_string())
        })?;
        let content_type = data
            .get("contentType")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ValidationError::InvalidParameter("Invalid params: 'contentType'".to_string())
            })?;

        match content_type {
            // Development convenience path: in-place content, nothing to
            // collide with
            CONTENT_TYPE_TBEARS => return Ok(()),
            CONTENT_TYPE_ZIP => {}
            other => {
                return Err(ValidationError::InvalidRequest(format!(
                    "Invalid contentType: {other}"
                )));
            }
        }

        let from = req.from.as_ref().ok_or_else(|| {
            ValidationError::InvalidParameter("Invalid params: 'from'".to_string())
        })?;
        let timestamp = req.timestamp.ok_or_else(|| {
            ValidationError::InvalidParameter("Invalid params: 'timestamp'".to_string())
        })?;

        let score_address = generate_score_address(from, timestamp, req.nonce.as_ref());
        if self
            .deploy_registry
            .get_deploy_info(None, &score_address)
            .await
            .is_some()
        {
            return Err(ValidationError::InvalidRequest(format!(
                "SCORE address already in use: {score_address}"
            )));
        }
        Ok(())
    }

    /// True only for a well-formed, non-zero contract address the registry
    /// does not report as active. Never-deployed contract addresses count as
    /// inactive; the zero address and opaque addresses never do.
    pub(crate) async fn is_inactive_score(&self, address: &Address) -> bool {
        address.is_contract()
            && *address != ZERO_SCORE_ADDRESS
            && !self.deploy_registry.is_score_active(None, address).await
    }

    /// The sender's committed balance must cover value + fee
    pub(crate) async fn check_balance(
        &self,
        from: &Address,
        value: U256,
        fee: U256,
    ) -> Result<(), ValidationError> {
        let balance = self.ledger.get_balance(None, from).await?;
        let required = value.checked_add(fee).ok_or_else(|| {
            ValidationError::InvalidParameter(format!(
                "required amount overflow: value({value}) + fee({fee})"
            ))
        })?;

        if balance < required {
            return Err(ValidationError::InvalidRequest(format!(
                "Out of balance: balance({balance}) < value({value}) + fee({fee})"
            )));
        }
        Ok(())
    }
}

/// Converts an optional wire value into the unsigned amount the balance
/// check works with; absent means 0
fn unsigned_value(value: Option<WireAmount>) -> Result<U256, ValidationError> {
    match value {
        Some(WireAmount::Negative(_)) => Err(ValidationError::InvalidParameter(
            "value < 0".to_string(),
        )),
        Some(WireAmount::Unsigned(value)) => Ok(value),
        None => Ok(U256::zero()),
    }
}

/// Recursive character-length sum over a nested JSON payload: mapping keys
/// count once, scalar values count their rendered length, mappings and
/// sequences recurse. Traversal order is irrelevant, only the sum matters.
pub(crate) fn character_length(value: &Value) -> usize {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| key.chars().count() + character_length(value))
            .sum(),
        Value::Array(items) => items.iter().map(character_length).sum(),
        Value::String(s) => s.chars().count(),
        Value::Number(n) => n.to_string().chars().count(),
        Value::Bool(b) => if *b { 4 } else { 5 },
        Value::Null => 0,
    }
}
