//! User entity representing every principal type in the Shifa system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles in the Shifa platform
///
/// Donors and requesters are OTP-verified phone principals without a
/// persistent credential. Partner roles carry email/password accounts.
/// Admins additionally require two-factor authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Donor,
    Requester,
    PartnerPharmacy,
    PartnerNgo,
    PartnerVolunteer,
    Admin,
}

impl UserRole {
    /// String form used in token claims and audit records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donor => "DONOR",
            Self::Requester => "REQUESTER",
            Self::PartnerPharmacy => "PARTNER_PHARMACY",
            Self::PartnerNgo => "PARTNER_NGO",
            Self::PartnerVolunteer => "PARTNER_VOLUNTEER",
            Self::Admin => "ADMIN",
        }
    }

    /// Whether this role requires a full account with email and password
    pub fn requires_account(&self) -> bool {
        !matches!(self, Self::Donor | Self::Requester)
    }

    /// Whether this role must complete two-factor authentication
    pub fn requires_two_factor(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this is a pickup/delivery partner role
    pub fn is_partner(&self) -> bool {
        matches!(
            self,
            Self::PartnerPharmacy | Self::PartnerNgo | Self::PartnerVolunteer
        )
    }
}

/// User entity
///
/// Never hard-deleted; deactivation clears `active` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Phone number in E.164 format (phone-verified principals)
    pub phone: Option<String>,

    /// Email address (partner and admin accounts)
    pub email: Option<String>,

    /// Display name
    pub name: Option<String>,

    /// Role determining permissions and credential requirements
    pub role: UserRole,

    /// Whether the user completed verification
    pub verified: bool,

    /// Whether the account is active
    pub active: bool,

    /// Partner organisation this user belongs to, if any
    pub partner_id: Option<Uuid>,

    /// Timestamp of the user's last login
    pub last_login_at: Option<DateTime<Utc>>,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a phone-only principal, verified by OTP
    pub fn from_phone(phone: impl Into<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phone: Some(phone.into()),
            email: None,
            name: None,
            role,
            verified: true,
            active: true,
            partner_id: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a provisioned account with an email address
    pub fn provisioned(email: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phone: None,
            email: Some(email.into().to_lowercase()),
            name: Some(name.into()),
            role,
            verified: false,
            active: true,
            partner_id: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Associates this user with a partner organisation
    pub fn with_partner(mut self, partner_id: Uuid) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    /// Marks the user as verified
    pub fn verify(&mut self) {
        self.verified = true;
        self.updated_at = Utc::now();
    }

    /// Deactivates the account
    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    /// Updates the last login timestamp
    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Whether this user's role mandates two-factor authentication
    pub fn requires_two_factor(&self) -> bool {
        self.role.requires_two_factor()
    }
}
