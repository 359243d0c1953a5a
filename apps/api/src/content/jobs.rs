use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: &'static str,
    pub title: &'static str,
    pub department: &'static str,
    pub location: &'static str,
    pub employment_type: &'static str,
    pub summary: &'static str,
    pub responsibilities: &'static [&'static str],
    pub requirements: &'static [&'static str],
}

pub static JOBS: &[JobListing] = &[
    JobListing {
        id: "senior-rust-engineer",
        title: "Senior Rust Engineer",
        department: "Engineering",
        location: "Remote",
        employment_type: "Full-time",
        summary: "Build the backend services behind our client platforms.",
        responsibilities: &[
            "Design and ship HTTP services in Rust",
            "Own reliability of production deployments",
            "Review code and mentor engineers",
        ],
        requirements: &[
            "4+ years building backend systems",
            "Production experience with async Rust",
            "Comfort with PostgreSQL and cloud infrastructure",
        ],
    },
    JobListing {
        id: "frontend-developer",
        title: "Frontend Developer",
        department: "Engineering",
        location: "Hybrid",
        employment_type: "Full-time",
        summary: "Craft fast, accessible interfaces for client products.",
        responsibilities: &[
            "Build React and Next.js applications",
            "Translate designs into polished components",
            "Keep Core Web Vitals green",
        ],
        requirements: &[
            "3+ years with TypeScript and React",
            "An eye for motion and detail",
        ],
    },
    JobListing {
        id: "product-designer",
        title: "Product Designer",
        department: "Design",
        location: "Remote",
        employment_type: "Full-time",
        summary: "Shape end-to-end product experiences with our clients.",
        responsibilities: &[
            "Run discovery workshops",
            "Deliver flows, prototypes, and design systems",
        ],
        requirements: &[
            "A portfolio of shipped products",
            "Fluency in Figma",
        ],
    },
    JobListing {
        id: "ml-engineer",
        title: "Machine Learning Engineer",
        department: "AI",
        location: "Remote",
        employment_type: "Contract",
        summary: "Integrate language models into client workflows.",
        responsibilities: &[
            "Prototype and evaluate LLM features",
            "Build retrieval pipelines",
        ],
        requirements: &[
            "Experience shipping ML to production",
            "Strong Python or Rust",
        ],
    },
];

pub fn find(id: &str) -> Option<&'static JobListing> {
    JOBS.iter().find(|j| j.id == id)
}

/// Listings in one department, case-insensitive. `None` returns all.
pub fn in_department(department: Option<&str>) -> Vec<&'static JobListing> {
    match department.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => JOBS
            .iter()
            .filter(|j| j.department.eq_ignore_ascii_case(d))
            .collect(),
        None => JOBS.iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique() {
        let ids: HashSet<_> = JOBS.iter().map(|j| j.id).collect();
        assert_eq!(ids.len(), JOBS.len());
    }

    #[test]
    fn test_find() {
        assert_eq!(find("product-designer").unwrap().department, "Design");
        assert!(find("astronaut").is_none());
    }

    #[test]
    fn test_department_filter() {
        assert_eq!(in_department(Some("engineering")).len(), 2);
        assert_eq!(in_department(Some(" ")).len(), JOBS.len());
        assert!(in_department(Some("Sales")).is_empty());
    }
}
