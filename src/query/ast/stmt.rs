//! 语句 AST 定义

use super::expression::Expression;
use super::macros::{impl_located, validated_serde};
use super::node::NodeKind;
use super::properties::PropertyMap;
use super::query::Query;
use super::table_element::TableElements;
use super::types::QualifiedName;
use crate::core::{AstError, AstResult, Location, NodeLocation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 语句枚举
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    Statements(Statements),
    CreateStream(CreateStream),
    CreateTable(CreateTable),
    CreateStreamAsSelect(CreateStreamAsSelect),
    CreateTableAsSelect(CreateTableAsSelect),
    InsertInto(InsertInto),
    DropTable(DropTable),
    CreateConnector(CreateConnector),
    Query(Query),
}

impl Statement {
    pub fn kind(&self) -> NodeKind {
        match self {
            Statement::Statements(_) => NodeKind::Statements,
            Statement::CreateStream(_) => NodeKind::CreateStream,
            Statement::CreateTable(_) => NodeKind::CreateTable,
            Statement::CreateStreamAsSelect(_) => NodeKind::CreateStreamAsSelect,
            Statement::CreateTableAsSelect(_) => NodeKind::CreateTableAsSelect,
            Statement::InsertInto(_) => NodeKind::InsertInto,
            Statement::DropTable(_) => NodeKind::DropTable,
            Statement::CreateConnector(_) => NodeKind::CreateConnector,
            Statement::Query(_) => NodeKind::Query,
        }
    }

    pub fn location(&self) -> Option<NodeLocation> {
        match self {
            Statement::Statements(s) => s.location(),
            Statement::CreateStream(s) => s.location(),
            Statement::CreateTable(s) => s.location(),
            Statement::CreateStreamAsSelect(s) => s.location(),
            Statement::CreateTableAsSelect(s) => s.location(),
            Statement::InsertInto(s) => s.location(),
            Statement::DropTable(s) => s.location(),
            Statement::CreateConnector(s) => s.location(),
            Statement::Query(s) => s.location(),
        }
    }
}

/// 有序的语句序列
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statements {
    pub(crate) location: Location,
    pub(crate) statements: Vec<Statement>,
}

impl Statements {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            location: Location::NONE,
            statements,
        }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

/// `CREATE STREAM name (elements) WITH (...)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreateStream {
    pub(crate) location: Location,
    pub(crate) name: QualifiedName,
    pub(crate) elements: TableElements,
    pub(crate) not_exists: bool,
    pub(crate) properties: PropertyMap,
}

impl CreateStream {
    pub fn new(
        name: QualifiedName,
        elements: TableElements,
        not_exists: bool,
        properties: PropertyMap,
    ) -> Self {
        Self {
            location: Location::NONE,
            name,
            elements,
            not_exists,
            properties,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn elements(&self) -> &TableElements {
        &self.elements
    }

    pub fn not_exists(&self) -> bool {
        self.not_exists
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// 替换列声明和属性，其余字段（含位置）保持不变
    pub fn copy_with(&self, elements: TableElements, properties: PropertyMap) -> Self {
        Self {
            location: self.location,
            name: self.name.clone(),
            elements,
            not_exists: self.not_exists,
            properties,
        }
    }
}

/// `CREATE TABLE name (elements) WITH (...)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreateTable {
    pub(crate) location: Location,
    pub(crate) name: QualifiedName,
    pub(crate) elements: TableElements,
    pub(crate) not_exists: bool,
    pub(crate) properties: PropertyMap,
}

impl CreateTable {
    pub fn new(
        name: QualifiedName,
        elements: TableElements,
        not_exists: bool,
        properties: PropertyMap,
    ) -> Self {
        Self {
            location: Location::NONE,
            name,
            elements,
            not_exists,
            properties,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn elements(&self) -> &TableElements {
        &self.elements
    }

    pub fn not_exists(&self) -> bool {
        self.not_exists
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// 替换列声明和属性，其余字段（含位置）保持不变
    pub fn copy_with(&self, elements: TableElements, properties: PropertyMap) -> Self {
        Self {
            location: self.location,
            name: self.name.clone(),
            elements,
            not_exists: self.not_exists,
            properties,
        }
    }
}

/// `CREATE STREAM name WITH (...) AS query [PARTITION BY expr]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreateStreamAsSelect {
    pub(crate) location: Location,
    pub(crate) name: QualifiedName,
    pub(crate) query: Query,
    pub(crate) not_exists: bool,
    pub(crate) properties: PropertyMap,
    pub(crate) partition_by: Option<Expression>,
}

impl CreateStreamAsSelect {
    pub fn new(
        name: QualifiedName,
        query: Query,
        not_exists: bool,
        properties: PropertyMap,
        partition_by: Option<Expression>,
    ) -> Self {
        Self {
            location: Location::NONE,
            name,
            query,
            not_exists,
            properties,
            partition_by,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn not_exists(&self) -> bool {
        self.not_exists
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn partition_by(&self) -> Option<&Expression> {
        self.partition_by.as_ref()
    }
}

/// `CREATE TABLE name WITH (...) AS query`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreateTableAsSelect {
    pub(crate) location: Location,
    pub(crate) name: QualifiedName,
    pub(crate) query: Query,
    pub(crate) not_exists: bool,
    pub(crate) properties: PropertyMap,
}

impl CreateTableAsSelect {
    pub fn new(
        name: QualifiedName,
        query: Query,
        not_exists: bool,
        properties: PropertyMap,
    ) -> Self {
        Self {
            location: Location::NONE,
            name,
            query,
            not_exists,
            properties,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn not_exists(&self) -> bool {
        self.not_exists
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

/// `INSERT INTO target query [PARTITION BY expr]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InsertInto {
    pub(crate) location: Location,
    pub(crate) target: QualifiedName,
    pub(crate) query: Query,
    pub(crate) partition_by: Option<Expression>,
}

impl InsertInto {
    pub fn new(target: QualifiedName, query: Query, partition_by: Option<Expression>) -> Self {
        Self {
            location: Location::NONE,
            target,
            query,
            partition_by,
        }
    }

    pub fn target(&self) -> &QualifiedName {
        &self.target
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn partition_by(&self) -> Option<&Expression> {
        self.partition_by.as_ref()
    }
}

/// `DROP TABLE [IF EXISTS] name [DELETE TOPIC]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropTable {
    pub(crate) location: Location,
    pub(crate) name: QualifiedName,
    pub(crate) if_exists: bool,
    pub(crate) delete_topic: bool,
}

impl DropTable {
    pub fn new(name: QualifiedName, if_exists: bool, delete_topic: bool) -> Self {
        Self {
            location: Location::NONE,
            name,
            if_exists,
            delete_topic,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn if_exists(&self) -> bool {
        self.if_exists
    }

    pub fn delete_topic(&self) -> bool {
        self.delete_topic
    }
}

/// 连接器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    Source,
    Sink,
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorType::Source => write!(f, "SOURCE"),
            ConnectorType::Sink => write!(f, "SINK"),
        }
    }
}

/// `CREATE SOURCE|SINK CONNECTOR name WITH (...)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CreateConnectorSerde")]
pub struct CreateConnector {
    pub(crate) location: Location,
    pub(crate) name: String,
    pub(crate) config: PropertyMap,
    pub(crate) connector_type: ConnectorType,
}

impl CreateConnector {
    pub fn new<S: Into<String>>(
        name: S,
        config: PropertyMap,
        connector_type: ConnectorType,
    ) -> AstResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(AstError::illegal_argument("连接器名称不能为空"));
        }
        Ok(Self {
            location: Location::NONE,
            name,
            config,
            connector_type,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PropertyMap {
        &self.config
    }

    pub fn connector_type(&self) -> ConnectorType {
        self.connector_type
    }
}

validated_serde!(CreateConnector as CreateConnectorSerde {
    name: String,
    config: PropertyMap,
    connector_type: ConnectorType,
} => |raw| CreateConnector::new(raw.name, raw.config, raw.connector_type));

impl_located!(
    Statements,
    CreateStream,
    CreateTable,
    CreateStreamAsSelect,
    CreateTableAsSelect,
    InsertInto,
    DropTable,
    CreateConnector,
);

macro_rules! impl_from_for_statement {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Statement {
                fn from(node: $variant) -> Self {
                    Statement::$variant(node)
                }
            }
        )+
    };
}

impl_from_for_statement!(
    Statements,
    CreateStream,
    CreateTable,
    CreateStreamAsSelect,
    CreateTableAsSelect,
    InsertInto,
    DropTable,
    CreateConnector,
    Query,
);

fn write_if_not_exists(f: &mut fmt::Formatter<'_>, not_exists: bool) -> fmt::Result {
    if not_exists {
        write!(f, "IF NOT EXISTS ")?;
    }
    Ok(())
}

fn write_with(f: &mut fmt::Formatter<'_>, properties: &PropertyMap) -> fmt::Result {
    if !properties.is_empty() {
        write!(f, " WITH {}", properties)?;
    }
    Ok(())
}

fn write_source(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    name: &QualifiedName,
    elements: &TableElements,
    not_exists: bool,
    properties: &PropertyMap,
) -> fmt::Result {
    write!(f, "CREATE {} ", keyword)?;
    write_if_not_exists(f, not_exists)?;
    write!(f, "{}", name)?;
    if !elements.is_empty() {
        write!(f, " {}", elements)?;
    }
    write_with(f, properties)
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Statements(s) => {
                let statements = s
                    .statements
                    .iter()
                    .map(|statement| statement.to_string())
                    .collect::<Vec<_>>()
                    .join(";\n");
                write!(f, "{}", statements)
            }
            Statement::CreateStream(s) => write_source(
                f,
                "STREAM",
                &s.name,
                &s.elements,
                s.not_exists,
                &s.properties,
            ),
            Statement::CreateTable(s) => write_source(
                f,
                "TABLE",
                &s.name,
                &s.elements,
                s.not_exists,
                &s.properties,
            ),
            Statement::CreateStreamAsSelect(s) => {
                write!(f, "CREATE STREAM ")?;
                write_if_not_exists(f, s.not_exists)?;
                write!(f, "{}", s.name)?;
                write_with(f, &s.properties)?;
                write!(f, " AS {}", s.query)?;
                if let Some(ref partition_by) = s.partition_by {
                    write!(f, " PARTITION BY {}", partition_by)?;
                }
                Ok(())
            }
            Statement::CreateTableAsSelect(s) => {
                write!(f, "CREATE TABLE ")?;
                write_if_not_exists(f, s.not_exists)?;
                write!(f, "{}", s.name)?;
                write_with(f, &s.properties)?;
                write!(f, " AS {}", s.query)
            }
            Statement::InsertInto(s) => {
                write!(f, "INSERT INTO {} {}", s.target, s.query)?;
                if let Some(ref partition_by) = s.partition_by {
                    write!(f, " PARTITION BY {}", partition_by)?;
                }
                Ok(())
            }
            Statement::DropTable(s) => {
                write!(f, "DROP TABLE ")?;
                if s.if_exists {
                    write!(f, "IF EXISTS ")?;
                }
                write!(f, "{}", s.name)?;
                if s.delete_topic {
                    write!(f, " DELETE TOPIC")?;
                }
                Ok(())
            }
            Statement::CreateConnector(s) => {
                write!(f, "CREATE {} CONNECTOR {}", s.connector_type, s.name)?;
                write_with(f, &s.config)
            }
            Statement::Query(q) => write!(f, "{}", q),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::literal::Literal;
    use crate::query::ast::query::{AllColumns, Select};
    use crate::query::ast::relation::{Relation, Table};
    use crate::query::ast::table_element::{Namespace, TableElement};
    use crate::query::ast::types::SqlType;

    fn name(value: &str) -> QualifiedName {
        QualifiedName::simple(value).expect("valid name")
    }

    fn select_all(source: &str) -> Query {
        Query::simple(
            Select::new(vec![AllColumns::new(None).into()]),
            Relation::Table(Table::new(name(source))),
        )
    }

    #[test]
    fn test_create_connector_display() {
        let connector = CreateConnector::new(
            "s3sink",
            PropertyMap::of([("connector.class", "S3")]),
            ConnectorType::Sink,
        )
        .expect("valid connector");
        assert_eq!(
            Statement::from(connector).to_string(),
            "CREATE SINK CONNECTOR s3sink WITH (\"connector.class\"='S3')"
        );
    }

    #[test]
    fn test_create_connector_requires_name() {
        let result = CreateConnector::new("", PropertyMap::new(), ConnectorType::Source);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_stream_display() {
        let stream = CreateStream::new(
            name("pageviews"),
            TableElements::of(vec![
                TableElement::new(Namespace::Key, "ID", SqlType::String).expect("valid"),
                TableElement::value("url", SqlType::String).expect("valid"),
            ]),
            true,
            PropertyMap::of([("kafka_topic", Literal::string("pv"))]),
        );
        assert_eq!(
            Statement::from(stream).to_string(),
            "CREATE STREAM IF NOT EXISTS pageviews (ID STRING KEY, url STRING) WITH (kafka_topic='pv')"
        );
    }

    #[test]
    fn test_create_table_copy_with_keeps_name_and_location() {
        let table = CreateTable::new(name("bob"), TableElements::new(), false, PropertyMap::new())
            .with_location(NodeLocation::new(1, 0));
        let props = PropertyMap::of([("value_format", "json")]);
        let copy = table.copy_with(TableElements::new(), props.clone());
        assert_eq!(copy.name(), &name("bob"));
        assert_eq!(copy.properties(), &props);
        assert_eq!(copy.location(), Some(NodeLocation::new(1, 0)));
    }

    #[test]
    fn test_drop_table_display() {
        let plain = Statement::from(DropTable::new(name("t"), false, false));
        assert_eq!(plain.to_string(), "DROP TABLE t");

        let full = Statement::from(DropTable::new(name("t"), true, true));
        assert_eq!(full.to_string(), "DROP TABLE IF EXISTS t DELETE TOPIC");
    }

    #[test]
    fn test_statements_display_and_kind() {
        let statements = Statement::from(Statements::new(vec![
            select_all("a").into(),
            DropTable::new(name("b"), false, false).into(),
        ]));
        assert_eq!(statements.kind(), NodeKind::Statements);
        assert_eq!(
            statements.to_string(),
            "SELECT * FROM a;\nDROP TABLE b"
        );
    }

    #[test]
    fn test_insert_into_display() {
        let insert = InsertInto::new(
            name("sink"),
            select_all("src"),
            Some(Expression::column(["id"]).expect("valid column")),
        );
        assert_eq!(
            Statement::from(insert).to_string(),
            "INSERT INTO sink SELECT * FROM src PARTITION BY id"
        );
    }
}
