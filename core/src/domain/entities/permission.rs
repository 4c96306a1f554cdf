//! Fine-grained permissions for authorization.

use serde::{Deserialize, Serialize};

use super::user::UserRole;

/// Closed permission set, grouped by domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    // Donation permissions
    DonationCreate,
    DonationViewOwn,
    DonationUploadImage,
    DonationViewAll,
    DonationVerify,
    DonationReject,

    // Request permissions
    RequestCreate,
    RequestViewOwn,
    RequestViewAll,

    // Match permissions
    MatchViewAssigned,
    MatchViewAll,
    MatchUpdateStatus,
    MatchConfirmPickup,
    MatchConfirmDelivery,

    // Partner permissions
    PartnerDashboardView,
    PartnerManage,
    PartnerVerify,

    // Admin permissions
    AdminDashboardView,
    ReportsView,
    SettingsManage,
    UsersManage,
}

impl Permission {
    /// Every permission in the system
    pub fn all() -> Vec<Permission> {
        use Permission::*;
        vec![
            DonationCreate,
            DonationViewOwn,
            DonationUploadImage,
            DonationViewAll,
            DonationVerify,
            DonationReject,
            RequestCreate,
            RequestViewOwn,
            RequestViewAll,
            MatchViewAssigned,
            MatchViewAll,
            MatchUpdateStatus,
            MatchConfirmPickup,
            MatchConfirmDelivery,
            PartnerDashboardView,
            PartnerManage,
            PartnerVerify,
            AdminDashboardView,
            ReportsView,
            SettingsManage,
            UsersManage,
        ]
    }

    /// Permissions granted to a role
    ///
    /// This mapping is closed: permissions are a pure function of the
    /// role, and `Admin` receives the full set.
    pub fn for_role(role: UserRole) -> Vec<Permission> {
        use Permission::*;
        match role {
            UserRole::Donor => vec![DonationCreate, DonationUploadImage, DonationViewOwn],
            UserRole::Requester => vec![RequestCreate, RequestViewOwn],
            UserRole::PartnerPharmacy | UserRole::PartnerNgo | UserRole::PartnerVolunteer => vec![
                PartnerDashboardView,
                MatchViewAssigned,
                MatchUpdateStatus,
                MatchConfirmPickup,
                MatchConfirmDelivery,
            ],
            UserRole::Admin => Permission::all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_gets_all_permissions() {
        assert_eq!(Permission::for_role(UserRole::Admin), Permission::all());
    }

    #[test]
    fn test_donor_permissions_are_scoped_to_donations() {
        let perms = Permission::for_role(UserRole::Donor);
        assert!(perms.contains(&Permission::DonationCreate));
        assert!(!perms.contains(&Permission::RequestCreate));
        assert!(!perms.contains(&Permission::UsersManage));
    }

    #[test]
    fn test_partner_roles_share_the_same_set() {
        assert_eq!(
            Permission::for_role(UserRole::PartnerPharmacy),
            Permission::for_role(UserRole::PartnerNgo)
        );
    }

    #[test]
    fn test_serializes_to_screaming_snake_case() {
        let json = serde_json::to_string(&Permission::DonationUploadImage).unwrap();
        assert_eq!(json, "\"DONATION_UPLOAD_IMAGE\"");
    }
}
