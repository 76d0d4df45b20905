use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIER: i32 = 3;

// Matched against id/name parts; queue tokens win when both vocabularies fire.
const QUEUE_TOKENS: [&str; 14] = [
    "topic",
    "queue",
    "kafka",
    "rabbit",
    "rabbitmq",
    "mq",
    "sqs",
    "sns",
    "pubsub",
    "stream",
    "event",
    "bus",
    "broker",
    "messaging",
];

const DATABASE_TOKENS: [&str; 12] = [
    "db",
    "database",
    "postgres",
    "mysql",
    "mongo",
    "redis",
    "sql",
    "store",
    "storage",
    "warehouse",
    "repository",
    "persistence",
];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShapeClass {
    Database,
    Queue,
    None,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ServiceRecord {
    pub id: String,
    pub name: String,
    pub labels: Vec<String>,
    pub tier: i32,
    pub owner: Option<String>,
    pub app_code: Option<String>,
    pub repo_url: Option<String>,
    pub comment: Option<String>,
    pub verified: bool,
    pub shape_class: ShapeClass,
}

impl ServiceRecord {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            labels: Vec::new(),
            tier: DEFAULT_TIER,
            owner: None,
            app_code: None,
            repo_url: None,
            comment: None,
            verified: false,
            shape_class: shape_class(id, name),
        }
    }

    pub fn display_label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn labels_display(&self) -> String {
        self.labels.join(", ")
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DependencyEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl DependencyEdge {
    // The edge id is deterministic from its endpoints; duplicates are allowed.
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            id: format!("{}->{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Service(ServiceRecord),
    Dependency(DependencyEdge),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Element::Service(service) => &service.id,
            Element::Dependency(edge) => &edge.id,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceRecord> {
        match self {
            Element::Service(service) => Some(service),
            Element::Dependency(_) => None,
        }
    }

    pub fn as_dependency(&self) -> Option<&DependencyEdge> {
        match self {
            Element::Service(_) => None,
            Element::Dependency(edge) => Some(edge),
        }
    }
}

pub fn services(elements: &[Element]) -> Vec<&ServiceRecord> {
    elements.iter().filter_map(Element::as_service).collect()
}

pub fn dependencies(elements: &[Element]) -> Vec<&DependencyEdge> {
    elements.iter().filter_map(Element::as_dependency).collect()
}

pub fn stats(elements: &[Element]) -> String {
    format!(
        "Services: {}, Dependencies: {}",
        services(elements).len(),
        dependencies(elements).len()
    )
}

/// Classify a record as database- or queue-shaped from its id and name.
pub fn shape_class(id: &str, name: &str) -> ShapeClass {
    let mut parts = identifier_parts(id);
    parts.extend(identifier_parts(name));

    if parts.iter().any(|p| matches_any(p, &QUEUE_TOKENS)) {
        return ShapeClass::Queue;
    }
    if parts.iter().any(|p| matches_any(p, &DATABASE_TOKENS)) {
        return ShapeClass::Database;
    }
    ShapeClass::None
}

// Whole-part matches only, so "adhub" never matches "db".
fn matches_any(part: &str, tokens: &[&str]) -> bool {
    tokens
        .iter()
        .any(|&token| part == token || part.strip_suffix('s') == Some(token))
}

fn identifier_parts(identifier: &str) -> Vec<String> {
    let separators = Regex::new(r"[-_./\s]+").unwrap();
    let mut parts = Vec::new();
    for chunk in separators.split(identifier) {
        split_camel_into(chunk, &mut parts);
    }
    parts
}

fn split_camel_into(chunk: &str, parts: &mut Vec<String>) {
    let mut current = String::new();
    let mut prev_is_lower = false;
    for ch in chunk.chars() {
        if ch.is_uppercase() && prev_is_lower && !current.is_empty() {
            parts.push(current.to_lowercase());
            current = String::new();
        }
        current.push(ch);
        prev_is_lower = ch.is_lowercase();
    }
    if !current.is_empty() {
        parts.push(current.to_lowercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_class_database() {
        assert_eq!(shape_class("user-db", "User Storage"), ShapeClass::Database);
        assert_eq!(shape_class("billing", "Postgres Cluster"), ShapeClass::Database);
        assert_eq!(shape_class("userDb", "Users"), ShapeClass::Database);
    }

    #[test]
    fn test_shape_class_queue() {
        assert_eq!(shape_class("order-topic", "Orders"), ShapeClass::Queue);
        assert_eq!(shape_class("jobs", "RabbitMQ Broker"), ShapeClass::Queue);
        assert_eq!(shape_class("audit", "event.stream"), ShapeClass::Queue);
    }

    #[test]
    fn test_shape_class_queue_wins_over_database() {
        assert_eq!(shape_class("orders-db-queue", "Orders"), ShapeClass::Queue);
        assert_eq!(shape_class("db", "Kafka Store"), ShapeClass::Queue);
    }

    #[test]
    fn test_shape_class_none() {
        assert_eq!(shape_class("adhub", "Ad Hub"), ShapeClass::None);
        assert_eq!(shape_class("frontend", "Web Frontend"), ShapeClass::None);
        // "db" embedded in a larger part is not a match
        assert_eq!(shape_class("feedback", "Feedback"), ShapeClass::None);
    }

    #[test]
    fn test_shape_class_plural_tokens() {
        assert_eq!(shape_class("payment-queues", "Payments"), ShapeClass::Queue);
        assert_eq!(shape_class("warehouses", "Inventory"), ShapeClass::Database);
    }

    #[test]
    fn test_identifier_parts_splits_camel_case_and_separators() {
        assert_eq!(identifier_parts("userDb"), vec!["user", "db"]);
        assert_eq!(identifier_parts("order_topic.v2"), vec!["order", "topic", "v2"]);
        assert_eq!(identifier_parts("User Storage"), vec!["user", "storage"]);
        assert_eq!(identifier_parts("RabbitMQ"), vec!["rabbit", "mq"]);
    }

    #[test]
    fn test_dependency_edge_id_is_deterministic() {
        let edge = DependencyEdge::new("api", "user-db");
        assert_eq!(edge.id, "api->user-db");
        assert_eq!(edge.source, "api");
        assert_eq!(edge.target, "user-db");
    }

    #[test]
    fn test_display_helpers() {
        let mut record = ServiceRecord::new("api", "API Gateway");
        record.labels = vec!["edge".to_string(), "platform".to_string()];
        assert_eq!(record.display_label(), "API Gateway");
        assert_eq!(record.labels_display(), "edge, platform");

        let unnamed = ServiceRecord {
            name: String::new(),
            ..ServiceRecord::new("api", "API Gateway")
        };
        assert_eq!(unnamed.display_label(), "api");
    }

    #[test]
    fn test_collection_helpers() {
        let elements = vec![
            Element::Service(ServiceRecord::new("api", "API")),
            Element::Dependency(DependencyEdge::new("api", "user-db")),
            Element::Service(ServiceRecord::new("user-db", "User DB")),
        ];
        assert_eq!(services(&elements).len(), 2);
        assert_eq!(dependencies(&elements).len(), 1);
        assert_eq!(stats(&elements), "Services: 2, Dependencies: 1");
    }
}
