//! Status helper enums mapping to SMALLINT lookup values.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Map a database status ID back to the enum, if known.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Review state of one workflow stage for one mockup.
    ProgressStatus {
        /// The stage exists in the workflow but the mockup has not reached it.
        NotStarted = 1,
        /// The stage is collecting reviewer approvals.
        InReview = 2,
        /// A reviewer sent the mockup back; waiting on a resubmission.
        ChangesRequested = 3,
        /// The stage met its quorum and is closed.
        Approved = 4,
        /// All stages are closed; waiting on the terminal final-approval gate.
        PendingFinalApproval = 5,
        /// The mockup was finalized by the project creator or an admin.
        FinalApproved = 6,
    }
}

impl ProgressStatus {
    /// The status name as seeded in the `progress_statuses` table.
    pub fn name(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InReview => "in_review",
            ProgressStatus::ChangesRequested => "changes_requested",
            ProgressStatus::Approved => "approved",
            ProgressStatus::PendingFinalApproval => "pending_final_approval",
            ProgressStatus::FinalApproved => "final_approved",
        }
    }

    /// Statuses that mark a stage row as the mockup's "current" row.
    ///
    /// Exactly one row per mockup may hold one of these at any time.
    pub fn is_current(self) -> bool {
        matches!(
            self,
            ProgressStatus::InReview
                | ProgressStatus::ChangesRequested
                | ProgressStatus::PendingFinalApproval
        )
    }
}
