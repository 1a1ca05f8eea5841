use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a closed label set with its display form and its store slug.
macro_rules! labels {
    ($name:ident { $($variant:ident => $display:literal, $slug:literal;)+ }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $display)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $display,)+
                }
            }

            /// Lowercase form written to the persisted store.
            pub fn slug(self) -> &'static str {
                match self {
                    $($name::$variant => $slug,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labels!(Category {
    Engineering => "Engineering", "engineering";
    Design => "Design", "design";
    Marketing => "Marketing", "marketing";
    Sales => "Sales", "sales";
    Operations => "Operations", "operations";
    Product => "Product", "product";
    Finance => "Finance", "finance";
    Other => "Other", "other";
});

labels!(EmploymentType {
    FullTime => "Full-time", "full-time";
    PartTime => "Part-time", "part-time";
    Contract => "Contract", "contract";
    Internship => "Internship", "internship";
});

labels!(ExperienceLevel {
    Entry => "Entry", "entry";
    Mid => "Mid", "mid";
    Senior => "Senior", "senior";
    Lead => "Lead", "lead";
    Executive => "Executive", "executive";
});

labels!(RemoteOption {
    Onsite => "Onsite", "onsite";
    Hybrid => "Hybrid", "hybrid";
    Remote => "Remote", "remote";
});

/// Job stub as found on a listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub title: String,
    pub url: String,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    /// Employer named on the listing itself (aggregator boards only).
    pub company: Option<String>,
}

impl RawListing {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        RawListing {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Fields read from an individual posting page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDetail {
    pub description: String,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub workplace: Option<RemoteOption>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
}

/// Canonical posting. `id` stays `None` until the merge assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub company: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub location: String,
    pub remote_option: RemoteOption,
    pub application_url: String,
    pub featured: bool,
    pub source: String,
    pub posted_date: String,
}
