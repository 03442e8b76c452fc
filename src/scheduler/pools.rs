//! Month-keyed topic pools
//!
//! Each calendar month can carry its own pool of study topics; months with
//! no pool of their own resolve to the default pool. Labels are unique
//! within a pool.

use std::collections::BTreeMap;

use super::error::{SchedulerError, SchedulerResult};

/// Topic pools keyed by month number (1-12) with a default fallback
#[derive(Debug, Clone)]
pub struct TopicPools {
    monthly: BTreeMap<u32, Vec<String>>,
    default_pool: Vec<String>,
}

impl TopicPools {
    /// Built-in pools covering the software-architect exam syllabus
    ///
    /// The spring exam sits in late May and the autumn exam in mid November,
    /// so the months leading into each get focused pools; every other month
    /// falls back to the default rotation.
    pub fn builtin() -> Self {
        let default_pool = to_pool(&[
            "Software engineering fundamentals",
            "System architecture design",
            "Database systems",
            "Computer networks",
            "Operating systems",
            "Information security",
        ]);

        let mut monthly = BTreeMap::new();
        monthly.insert(
            2,
            to_pool(&[
                "Requirements engineering",
                "UML and system modeling",
                "Software process models",
                "Project scope and schedule management",
            ]),
        );
        monthly.insert(
            3,
            to_pool(&[
                "Architecture styles and patterns",
                "Middleware and system integration",
                "Distributed systems",
                "Quality attributes and tactics",
            ]),
        );
        monthly.insert(
            4,
            to_pool(&[
                "Database design and normalization",
                "Transactions and concurrency control",
                "Query optimization",
                "Data warehousing and OLAP",
            ]),
        );
        monthly.insert(
            5,
            to_pool(&[
                "Mock exam review",
                "Architecture case study analysis",
                "Essay question practice",
                "Past paper drills",
            ]),
        );
        monthly.insert(
            9,
            to_pool(&[
                "Network protocols and routing",
                "Network planning and design",
                "Network security",
                "Storage and virtualization",
            ]),
        );
        monthly.insert(
            10,
            to_pool(&[
                "Information security management",
                "Cryptography fundamentals",
                "Standards, law and intellectual property",
                "Reliability and fault tolerance",
            ]),
        );
        monthly.insert(
            11,
            to_pool(&[
                "Mock exam review",
                "Past paper drills",
                "Weak-area consolidation",
            ]),
        );

        Self {
            monthly,
            default_pool,
        }
    }

    /// Build pools from the built-ins plus config overrides
    ///
    /// Override keys are month numbers ("1"-"12") or "default"; an override
    /// replaces the whole pool for that key.
    pub fn with_overrides(overrides: &BTreeMap<String, Vec<String>>) -> SchedulerResult<Self> {
        let mut pools = Self::builtin();

        for (key, topics) in overrides {
            if key == "default" {
                pools.default_pool = topics.clone();
            } else if let Ok(month) = key.parse::<u32>() {
                pools.monthly.insert(month, topics.clone());
            }
        }

        pools.validate()?;
        Ok(pools)
    }

    /// Resolve the active pool for a period
    ///
    /// A period with no pool, or with an empty pool, resolves to the default
    /// pool.
    pub fn for_period(&self, period: u32) -> &[String] {
        match self.monthly.get(&period) {
            Some(pool) if !pool.is_empty() => pool,
            _ => &self.default_pool,
        }
    }

    /// Check label uniqueness within every pool
    pub fn validate(&self) -> SchedulerResult<()> {
        check_unique("default", &self.default_pool)?;
        for (month, pool) in &self.monthly {
            check_unique(&month.to_string(), pool)?;
        }
        Ok(())
    }

    /// Iterate (period, pool) pairs, default pool last under key 0
    pub fn iter(&self) -> impl Iterator<Item = (Option<u32>, &[String])> {
        self.monthly
            .iter()
            .map(|(m, p)| (Some(*m), p.as_slice()))
            .chain(std::iter::once((None, self.default_pool.as_slice())))
    }
}

impl Default for TopicPools {
    fn default() -> Self {
        Self::builtin()
    }
}

fn to_pool(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn check_unique(pool_name: &str, pool: &[String]) -> SchedulerResult<()> {
    let mut seen = std::collections::HashSet::new();
    for label in pool {
        if !seen.insert(label.as_str()) {
            return Err(SchedulerError::DuplicateTopic {
                pool: pool_name.to_string(),
                label: label.clone(),
            });
        }
    }
    Ok(())
}
