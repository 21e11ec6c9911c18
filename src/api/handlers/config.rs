use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ok, ApiResult};
use crate::errors::AppError;
use crate::evaluation::RiskProfile;
use crate::AppState;

const MAX_LOSS_PCT: &str = "max_loss_pct";
const MUST_TP_PCT: &str = "must_tp_pct";
const ALLOWED_KEYS: &[&str] = &[MAX_LOSS_PCT, MUST_TP_PCT];

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

fn apply_entry(profile: &mut RiskProfile, key: &str, value: Decimal) {
    match key {
        MAX_LOSS_PCT => profile.max_loss_pct = value,
        MUST_TP_PCT => profile.must_tp_pct = value,
        _ => {}
    }
}

/// Effective risk profile: env defaults, then stored overrides, then the
/// per-request override when given.
pub async fn resolve_risk_profile(
    state: &AppState,
    request_override: Option<RiskProfile>,
) -> Result<RiskProfile, AppError> {
    if let Some(profile) = request_override {
        profile.validate()?;
        return Ok(profile);
    }

    let mut profile = state.config.risk_profile();
    for entry in state.store.get_runtime_config().await? {
        if !ALLOWED_KEYS.contains(&entry.key.as_str()) {
            continue;
        }
        match entry.value.parse::<Decimal>() {
            Ok(value) => apply_entry(&mut profile, &entry.key, value),
            Err(e) => {
                tracing::warn!(key = %entry.key, value = %entry.value, error = %e, "Ignoring unparsable runtime config");
            }
        }
    }

    // Out-of-range stored values fall back to the environment defaults.
    if let Err(e) = profile.validate() {
        tracing::warn!(error = %e, "Stored risk profile is invalid, using environment defaults");
        return Ok(state.config.risk_profile());
    }
    Ok(profile)
}

fn entries(profile: &RiskProfile) -> Vec<ConfigEntry> {
    vec![
        ConfigEntry {
            key: MAX_LOSS_PCT.into(),
            value: profile.max_loss_pct.to_string(),
        },
        ConfigEntry {
            key: MUST_TP_PCT.into(),
            value: profile.must_tp_pct.to_string(),
        },
    ]
}

/// GET /api/config: effective risk profile
pub async fn get_config(State(state): State<AppState>) -> ApiResult<Vec<ConfigEntry>> {
    let profile = resolve_risk_profile(&state, None).await?;
    ok(entries(&profile))
}

#[derive(Debug, Deserialize)]
pub struct UpdateConfigRequest {
    pub entries: HashMap<String, String>,
}

/// PUT /api/config: store risk profile overrides
pub async fn update_config(
    State(state): State<AppState>,
    Json(body): Json<UpdateConfigRequest>,
) -> ApiResult<Vec<ConfigEntry>> {
    let filtered: HashMap<String, String> = body
        .entries
        .into_iter()
        .filter(|(k, _)| ALLOWED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k, v.trim().to_string()))
        .collect();

    if filtered.is_empty() {
        return Err(AppError::BadRequest("No valid config keys provided".into()));
    }

    // Validate the merged result before anything is written.
    let mut candidate = resolve_risk_profile(&state, None).await?;
    for (key, raw) in &filtered {
        let value: Decimal = raw
            .parse()
            .map_err(|_| AppError::BadRequest(format!("{key} is not a decimal: {raw}")))?;
        apply_entry(&mut candidate, key, value);
    }
    candidate.validate()?;

    state.store.upsert_runtime_config(&filtered).await?;
    tracing::info!(
        max_loss_pct = %candidate.max_loss_pct,
        must_tp_pct = %candidate.must_tp_pct,
        "Risk profile updated"
    );

    ok(entries(&candidate))
}
