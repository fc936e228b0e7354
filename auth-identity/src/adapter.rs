// Database-backed authentication workflow
use crate::config::AuthSettings;
use crate::error::{IdentityError, Result};
use crate::matcher::{CredentialCallback, CredentialMatcher};
use crate::outcome::{
    AuthOutcome, AuthResultCode, MSG_CREDENTIAL_INVALID, MSG_IDENTITY_AMBIGUOUS,
    MSG_IDENTITY_NOT_FOUND, MSG_SUCCESS,
};
use async_trait::async_trait;
use config_engine::DEFAULT_CONNECTION;
use database_layer::{
    match_flag_set, ColumnLookup, ColumnSelection, CredentialTreatment, QueryGateway, Row,
    TableRef, TreatmentMode, CREDENTIAL_MATCH_COLUMN,
};
use error_common::{log_error, ErrorCategory};
use logger_redacted::CredentialRedactor;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// Pluggable authentication adapter contract
#[async_trait]
pub trait AuthenticationAdapter: Send {
    fn set_identity(&mut self, identity: &str);
    fn set_credential(&mut self, credential: &str);

    /// Attempt authentication with the current identity and credential.
    ///
    /// Authentication failures are `Ok` outcomes. `Err` is reserved for
    /// configuration and data-access errors.
    async fn authenticate(&mut self) -> Result<AuthOutcome>;
}

/// Authenticates an identity and credential against one table.
///
/// Candidate rows are fetched by identity through a [`QueryGateway`], then
/// checked in query order with the configured [`CredentialMatcher`]. The first
/// matching row wins. When every row fails, the last failure is reported.
pub struct DbAuthAdapter {
    gateway: Arc<dyn QueryGateway>,
    connection: String,
    table_name: String,
    identity_column: String,
    credential_column: String,
    ambiguity_identity: bool,
    matcher: CredentialMatcher,
    identity: Option<String>,
    credential: Option<String>,
    result_row: Option<Row>,
    redactor: CredentialRedactor,
}

impl DbAuthAdapter {
    pub fn new(gateway: Arc<dyn QueryGateway>) -> Self {
        Self {
            gateway,
            connection: DEFAULT_CONNECTION.to_string(),
            table_name: String::new(),
            identity_column: String::new(),
            credential_column: String::new(),
            ambiguity_identity: false,
            matcher: CredentialMatcher::default(),
            identity: None,
            credential: None,
            result_row: None,
            redactor: CredentialRedactor::default(),
        }
    }

    /// Adapter comparing credentials in process; strict equality when `callback` is `None`
    pub fn callback_check(
        gateway: Arc<dyn QueryGateway>,
        table_name: &str,
        identity_column: &str,
        credential_column: &str,
        callback: Option<CredentialCallback>,
    ) -> Self {
        let mut adapter = Self::new(gateway);
        adapter
            .set_table_name(table_name)
            .set_identity_column(identity_column)
            .set_credential_column(credential_column)
            .set_credential_validation_callback(callback.unwrap_or_default());
        adapter
    }

    /// Adapter letting the database evaluate `treatment`, e.g. `MD5(?)`
    pub fn credential_treatment(
        gateway: Arc<dyn QueryGateway>,
        table_name: &str,
        identity_column: &str,
        credential_column: &str,
        treatment: &str,
    ) -> Self {
        let mut adapter = Self::new(gateway);
        adapter
            .set_table_name(table_name)
            .set_identity_column(identity_column)
            .set_credential_column(credential_column)
            .set_credential_treatment(treatment);
        adapter
    }

    pub fn from_settings(gateway: Arc<dyn QueryGateway>, settings: &AuthSettings) -> Result<Self> {
        let mut adapter = Self::new(gateway);
        adapter
            .set_connection(&settings.connection)
            .set_table_name(&settings.table)
            .set_identity_column(&settings.identity_column)
            .set_credential_column(&settings.credential_column)
            .set_ambiguity_identity(settings.ambiguity_identity);
        adapter.matcher = settings.matcher()?;
        Ok(adapter)
    }

    #[must_use]
    pub fn with_redactor(mut self, redactor: CredentialRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn set_connection(&mut self, connection: &str) -> &mut Self {
        self.connection = if connection.is_empty() {
            DEFAULT_CONNECTION.to_string()
        } else {
            connection.to_string()
        };
        self
    }

    /// Plain or `schema.table`
    pub fn set_table_name(&mut self, table_name: &str) -> &mut Self {
        self.table_name = table_name.to_string();
        self
    }

    pub fn set_identity_column(&mut self, identity_column: &str) -> &mut Self {
        self.identity_column = identity_column.to_string();
        self
    }

    pub fn set_credential_column(&mut self, credential_column: &str) -> &mut Self {
        self.credential_column = credential_column.to_string();
        self
    }

    /// Allow several rows to share an identity; each is tried in turn
    pub fn set_ambiguity_identity(&mut self, flag: bool) -> &mut Self {
        self.ambiguity_identity = flag;
        self
    }

    pub fn ambiguity_identity(&self) -> bool {
        self.ambiguity_identity
    }

    pub fn set_credential_validation_callback(&mut self, callback: CredentialCallback) -> &mut Self {
        self.matcher = CredentialMatcher::Callback(callback);
        self
    }

    /// Switches to database-side matching, keeping the current mode if already in it
    pub fn set_credential_treatment(&mut self, treatment: &str) -> &mut Self {
        let mode = match &self.matcher {
            CredentialMatcher::Treatment(current) => current.mode(),
            CredentialMatcher::Callback(_) => TreatmentMode::default(),
        };
        self.matcher = CredentialMatcher::Treatment(CredentialTreatment::new(treatment).with_mode(mode));
        self
    }

    /// Has no effect on callback matching
    pub fn set_credential_treatment_mode(&mut self, mode: TreatmentMode) -> &mut Self {
        if let CredentialMatcher::Treatment(treatment) = &self.matcher {
            self.matcher = CredentialMatcher::Treatment(treatment.clone().with_mode(mode));
        }
        self
    }

    pub fn matcher(&self) -> &CredentialMatcher {
        &self.matcher
    }

    pub fn set_identity(&mut self, identity: &str) -> &mut Self {
        self.identity = Some(identity.to_string());
        self
    }

    pub fn set_credential(&mut self, credential: &str) -> &mut Self {
        self.credential = Some(credential.to_string());
        self
    }

    /// The row matched by the last successful authentication, projected.
    ///
    /// `None` when no authentication has succeeded since the last attempt began.
    pub fn result_row_object(&self, selection: &ColumnSelection) -> Option<Row> {
        self.result_row.as_ref().map(|row| row.project(selection))
    }

    pub async fn authenticate(&mut self) -> Result<AuthOutcome> {
        self.result_row = None;
        let (identity, credential) = self.validate_setup()?;

        let span = info_span!(
            "authenticate",
            table = %self.table_name,
            identity = %self.redactor.identity(&identity),
            credential = %self.redactor.mask(&credential),
        );
        self.run(identity, credential).instrument(span).await
    }

    fn validate_setup(&self) -> Result<(String, String)> {
        if self.table_name.is_empty() {
            return Err(IdentityError::MissingTable);
        }
        if self.identity_column.is_empty() {
            return Err(IdentityError::MissingIdentityColumn);
        }
        if self.credential_column.is_empty() {
            return Err(IdentityError::MissingCredentialColumn);
        }
        let identity = match &self.identity {
            Some(identity) if !identity.is_empty() => identity.clone(),
            _ => return Err(IdentityError::MissingIdentity),
        };
        let credential = self.credential.clone().ok_or(IdentityError::MissingCredential)?;
        Ok((identity, credential))
    }

    async fn run(&mut self, identity: String, credential: String) -> Result<AuthOutcome> {
        let rows = self.query(&identity, &credential).await?;
        debug!(candidates = rows.len(), "Candidate rows fetched");

        if rows.is_empty() {
            return Ok(self.fail(
                AuthResultCode::FailureIdentityNotFound,
                identity,
                vec![MSG_IDENTITY_NOT_FOUND.to_string()],
            ));
        }
        if rows.len() > 1 && !self.ambiguity_identity {
            return Ok(self.fail(
                AuthResultCode::FailureIdentityAmbiguous,
                identity,
                vec![MSG_IDENTITY_AMBIGUOUS.to_string()],
            ));
        }

        let mut messages = Vec::new();
        let mut last = AuthResultCode::Failure;
        for row in rows {
            last = self.check_row(&row, &credential, &mut messages);
            if last.is_valid() {
                let held = row.without(&[CREDENTIAL_MATCH_COLUMN]);
                let payload = held.without(&[self.credential_column.as_str()]);
                self.result_row = Some(held);
                messages.push(MSG_SUCCESS.to_string());

                info!("Authentication succeeded");
                return Ok(AuthOutcome::new(last, identity, messages).with_row(payload));
            }
        }

        Ok(self.fail(last, identity, messages))
    }

    async fn query(&self, identity: &str, credential: &str) -> Result<Vec<Row>> {
        let lookup = ColumnLookup::new(
            TableRef::parse(&self.table_name),
            self.identity_column.as_str(),
            identity,
        );

        let rows = match &self.matcher {
            CredentialMatcher::Callback(_) => {
                self.gateway.find_by_column(&self.connection, &lookup).await
            }
            CredentialMatcher::Treatment(treatment) => {
                debug!(
                    expression = %self.redactor.redact_sql(&treatment.render_literal(credential)),
                    mode = ?treatment.mode(),
                    "Matching with credential treatment"
                );
                self.gateway
                    .find_with_credential_match(
                        &self.connection,
                        &lookup,
                        &self.credential_column,
                        treatment,
                        credential,
                    )
                    .await
            }
        };

        rows.map_err(|e| {
            log_error("authentication lookup", &e);
            IdentityError::from(e)
        })
    }

    fn check_row(&self, row: &Row, credential: &str, messages: &mut Vec<String>) -> AuthResultCode {
        match &self.matcher {
            CredentialMatcher::Callback(callback) => {
                let stored = row.get(&self.credential_column).unwrap_or(&Value::Null);
                match callback.check(stored, credential) {
                    Ok(true) => AuthResultCode::Success,
                    Ok(false) => {
                        messages.push(MSG_CREDENTIAL_INVALID.to_string());
                        AuthResultCode::FailureCredentialInvalid
                    }
                    Err(e) => {
                        warn!(callback = %callback.name(), "Credential callback failed: {}", e);
                        messages.push(e.to_string());
                        AuthResultCode::FailureUncategorized
                    }
                }
            }
            CredentialMatcher::Treatment(_) => {
                if match_flag_set(row) {
                    AuthResultCode::Success
                } else {
                    messages.push(MSG_CREDENTIAL_INVALID.to_string());
                    AuthResultCode::FailureCredentialInvalid
                }
            }
        }
    }

    fn fail(&self, code: AuthResultCode, identity: String, messages: Vec<String>) -> AuthOutcome {
        warn!(
            code = ?code,
            error_code = code.error_code().unwrap_or_default(),
            error_category = %code.category().map_or("", ErrorCategory::as_str),
            "Authentication failed"
        );
        AuthOutcome::new(code, identity, messages)
    }
}

#[async_trait]
impl AuthenticationAdapter for DbAuthAdapter {
    fn set_identity(&mut self, identity: &str) {
        DbAuthAdapter::set_identity(self, identity);
    }

    fn set_credential(&mut self, credential: &str) {
        DbAuthAdapter::set_credential(self, credential);
    }

    async fn authenticate(&mut self) -> Result<AuthOutcome> {
        DbAuthAdapter::authenticate(self).await
    }
}
