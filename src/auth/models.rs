//! Authentication Models
//! Mission: Define the role/permission authority model and token claim shapes

use serde::{Deserialize, Serialize};

/// User roles in the meditation center system.
///
/// Closed set; each role carries a fixed permission set assigned at
/// definition time. There is no runtime mutation API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    /// Regular user - can view programs, create bookings, manage own profile
    #[serde(rename = "USER")]
    User,
    /// Instructor - can manage assigned programs and view student information
    #[serde(rename = "INSTRUCTOR")]
    Instructor,
    /// Administrator - full access to all system features
    #[serde(rename = "ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Instructor => "INSTRUCTOR",
            Role::Admin => "ADMIN",
        }
    }

    /// Parse a role name. Unrecognized names yield `None`; callers must treat
    /// that as a hard failure, never fall back to a default role.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(Role::User),
            "INSTRUCTOR" => Some(Role::Instructor),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Coarse authority label for role-only checks (e.g. "ROLE_ADMIN").
    pub fn authority(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Instructor => "ROLE_INSTRUCTOR",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    /// The fixed permission set granted by this role. Total over the closed
    /// role set and never empty. Roles may share permissions.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::User => &[
                Permission::ViewPrograms,
                Permission::CreateBooking,
                Permission::ViewOwnBookings,
                Permission::CancelOwnBooking,
                Permission::UpdateOwnProfile,
                Permission::ViewEvents,
                Permission::RegisterForEvent,
            ],
            Role::Instructor => &[
                Permission::ViewPrograms,
                Permission::ViewAssignedPrograms,
                Permission::MarkAttendance,
                Permission::ViewStudents,
                Permission::UpdateOwnProfile,
            ],
            Role::Admin => &[
                Permission::ViewPrograms,
                Permission::CreateProgram,
                Permission::UpdateProgram,
                Permission::DeleteProgram,
                Permission::ViewAllBookings,
                Permission::CancelAnyBooking,
                Permission::ViewUsers,
                Permission::CreateUser,
                Permission::UpdateUser,
                Permission::DeleteUser,
                Permission::AssignInstructor,
                Permission::ViewEvents,
                Permission::CreateEvent,
                Permission::UpdateEvent,
                Permission::DeleteEvent,
                Permission::ViewDonations,
                Permission::ManagePricing,
                Permission::ViewReports,
                Permission::ExportData,
            ],
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

/// Fine-grained capabilities. Permissions are never composed from other
/// permissions; role -> permission is the only indirection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    // Program permissions
    ViewPrograms,
    CreateProgram,
    UpdateProgram,
    DeleteProgram,
    ViewAssignedPrograms,

    // Booking permissions
    ViewOwnBookings,
    ViewAllBookings,
    CreateBooking,
    CancelOwnBooking,
    CancelAnyBooking,

    // User management permissions
    ViewUsers,
    CreateUser,
    UpdateUser,
    DeleteUser,
    UpdateOwnProfile,
    AssignInstructor,

    // Instructor permissions
    MarkAttendance,
    ViewStudents,

    // Event permissions
    ViewEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    RegisterForEvent,

    // Donation permissions
    ViewDonations,

    // Pricing permissions
    ManagePricing,

    // Reporting permissions
    ViewReports,
    ExportData,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewPrograms => "VIEW_PROGRAMS",
            Permission::CreateProgram => "CREATE_PROGRAM",
            Permission::UpdateProgram => "UPDATE_PROGRAM",
            Permission::DeleteProgram => "DELETE_PROGRAM",
            Permission::ViewAssignedPrograms => "VIEW_ASSIGNED_PROGRAMS",
            Permission::ViewOwnBookings => "VIEW_OWN_BOOKINGS",
            Permission::ViewAllBookings => "VIEW_ALL_BOOKINGS",
            Permission::CreateBooking => "CREATE_BOOKING",
            Permission::CancelOwnBooking => "CANCEL_OWN_BOOKING",
            Permission::CancelAnyBooking => "CANCEL_ANY_BOOKING",
            Permission::ViewUsers => "VIEW_USERS",
            Permission::CreateUser => "CREATE_USER",
            Permission::UpdateUser => "UPDATE_USER",
            Permission::DeleteUser => "DELETE_USER",
            Permission::UpdateOwnProfile => "UPDATE_OWN_PROFILE",
            Permission::AssignInstructor => "ASSIGN_INSTRUCTOR",
            Permission::MarkAttendance => "MARK_ATTENDANCE",
            Permission::ViewStudents => "VIEW_STUDENTS",
            Permission::ViewEvents => "VIEW_EVENTS",
            Permission::CreateEvent => "CREATE_EVENT",
            Permission::UpdateEvent => "UPDATE_EVENT",
            Permission::DeleteEvent => "DELETE_EVENT",
            Permission::RegisterForEvent => "REGISTER_FOR_EVENT",
            Permission::ViewDonations => "VIEW_DONATIONS",
            Permission::ManagePricing => "MANAGE_PRICING",
            Permission::ViewReports => "VIEW_REPORTS",
            Permission::ExportData => "EXPORT_DATA",
        }
    }
}

/// Token class. ACCESS tokens authorize API calls; REFRESH tokens only mint
/// new ACCESS tokens. The codec rejects cross-use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenType {
    #[serde(rename = "ACCESS")]
    Access,
    #[serde(rename = "REFRESH")]
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "ACCESS",
            TokenType::Refresh => "REFRESH",
        }
    }
}

/// JWT claims payload.
///
/// Refresh tokens carry no role claim (minimal claims by design); the role
/// is re-read from the account store when a new access token is minted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iss: String,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch; `exp <= now` means expired
    pub exp: i64,
}

/// User account as stored. The password hash never leaves the store layer
/// except through [`AccountCredential`] for login verification.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Account {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub mobile_number: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: String,
}

/// Account plus its credential verifier input, for login only.
#[derive(Debug, Clone)]
pub struct AccountCredential {
    pub account: Account,
    pub password_hash: String,
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub mobile_number: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh request body
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair response for login/register; refresh responses omit the
/// refresh token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Account view returned to clients (no credential material).
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub email_verified: bool,
}

impl AccountResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            user_id: account.user_id,
            email: account.email.clone(),
            name: account.name.clone(),
            role: account.role,
            is_active: account.is_active,
            email_verified: account.email_verified,
        }
    }
}

/// Create user request (admin)
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub mobile_number: Option<String>,
    pub role: Role,
}

/// Activate/deactivate request (admin)
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let admin = Role::Admin;
        let json = serde_json::to_string(&admin).unwrap();
        assert_eq!(json, r#""ADMIN""#);

        let user: Role = serde_json::from_str(r#""USER""#).unwrap();
        assert_eq!(user, Role::User);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert_eq!(Role::from_str("SUPERUSER"), None);
        assert!(serde_json::from_str::<Role>(r#""SUPERUSER""#).is_err());
    }

    #[test]
    fn test_role_authority_labels() {
        assert_eq!(Role::User.authority(), "ROLE_USER");
        assert_eq!(Role::Instructor.authority(), "ROLE_INSTRUCTOR");
        assert_eq!(Role::Admin.authority(), "ROLE_ADMIN");
    }

    #[test]
    fn test_permission_sets_are_never_empty() {
        for role in [Role::User, Role::Instructor, Role::Admin] {
            assert!(!role.permissions().is_empty(), "{:?}", role);
        }
    }

    #[test]
    fn test_roles_may_share_permissions() {
        // VIEW_PROGRAMS is granted to every role
        for role in [Role::User, Role::Instructor, Role::Admin] {
            assert!(role.has_permission(Permission::ViewPrograms));
        }
    }

    #[test]
    fn test_user_lacks_admin_permissions() {
        assert!(!Role::User.has_permission(Permission::CreateProgram));
        assert!(!Role::User.has_permission(Permission::ViewAllBookings));
        assert!(Role::Admin.has_permission(Permission::CreateProgram));
    }

    #[test]
    fn test_token_type_serialization() {
        assert_eq!(
            serde_json::to_string(&TokenType::Access).unwrap(),
            r#""ACCESS""#
        );
        let t: TokenType = serde_json::from_str(r#""REFRESH""#).unwrap();
        assert_eq!(t, TokenType::Refresh);
    }

    #[test]
    fn test_claims_wire_format() {
        let claims = Claims {
            sub: "a@x.com".to_string(),
            user_id: 1,
            role: Some(Role::User),
            token_type: TokenType::Access,
            iss: "meditation-center".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_000_900,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], "a@x.com");
        assert_eq!(json["userId"], 1);
        assert_eq!(json["role"], "USER");
        assert_eq!(json["type"], "ACCESS");

        // refresh tokens omit the role claim entirely
        let refresh = Claims {
            role: None,
            token_type: TokenType::Refresh,
            ..claims
        };
        let json = serde_json::to_value(&refresh).unwrap();
        assert!(json.get("role").is_none());
    }
}
