//! 查询 AST 定义
//!
//! `Query` = SELECT + FROM + 可选 WINDOW/WHERE/GROUP BY/HAVING + LIMIT。
//! 分组结构通过 `enumerate_grouping_sets` 展开为若干个不同的分组列集合。

use super::expression::Expression;
use super::macros::{impl_located, validated_serde};
use super::relation::Relation;
use super::types::QualifiedName;
use super::window::WindowExpression;
use crate::core::{AstError, AstResult, Location, NodeLocation};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// CUBE 允许的最多不同列数（展开后为 2^n 个分组集合）
pub const MAX_CUBE_COLUMNS: usize = 16;

/// GROUP BY 各元素笛卡尔积（去重前）允许的最多组合数
pub const MAX_GROUPING_SETS: usize = 1 << MAX_CUBE_COLUMNS;

/// 一个分组集合：无序、列去重
pub type GroupingSet = IndexSet<Expression>;

/// 查询
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    pub(crate) location: Location,
    pub(crate) select: Select,
    pub(crate) from: Relation,
    pub(crate) window: Option<WindowExpression>,
    pub(crate) where_clause: Option<Expression>,
    pub(crate) group_by: Option<GroupBy>,
    pub(crate) having: Option<Expression>,
    pub(crate) limit: Option<u32>,
}

impl Query {
    pub fn new(
        select: Select,
        from: Relation,
        window: Option<WindowExpression>,
        where_clause: Option<Expression>,
        group_by: Option<GroupBy>,
        having: Option<Expression>,
        limit: Option<u32>,
    ) -> Self {
        Self {
            location: Location::NONE,
            select,
            from,
            window,
            where_clause,
            group_by,
            having,
            limit,
        }
    }

    /// 仅有 SELECT 和 FROM 的简单查询
    pub fn simple(select: Select, from: Relation) -> Self {
        Self::new(select, from, None, None, None, None, None)
    }

    pub fn select(&self) -> &Select {
        &self.select
    }

    pub fn from(&self) -> &Relation {
        &self.from
    }

    pub fn window(&self) -> Option<&WindowExpression> {
        self.window.as_ref()
    }

    pub fn where_clause(&self) -> Option<&Expression> {
        self.where_clause.as_ref()
    }

    pub fn group_by(&self) -> Option<&GroupBy> {
        self.group_by.as_ref()
    }

    pub fn having(&self) -> Option<&Expression> {
        self.having.as_ref()
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} FROM {}", self.select, self.from)?;
        if let Some(ref window) = self.window {
            write!(f, " {}", window)?;
        }
        if let Some(ref where_clause) = self.where_clause {
            write!(f, " WHERE {}", where_clause)?;
        }
        if let Some(ref group_by) = self.group_by {
            write!(f, " {}", group_by)?;
        }
        if let Some(ref having) = self.having {
            write!(f, " HAVING {}", having)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        Ok(())
    }
}

/// SELECT 列表
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Select {
    pub(crate) location: Location,
    pub(crate) select_items: Vec<SelectItem>,
}

impl Select {
    pub fn new(select_items: Vec<SelectItem>) -> Self {
        Self {
            location: Location::NONE,
            select_items,
        }
    }

    pub fn select_items(&self) -> &[SelectItem] {
        &self.select_items
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self
            .select_items
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "SELECT {}", items)
    }
}

/// SELECT 列表项
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectItem {
    Single(SingleColumn),
    All(AllColumns),
}

impl SelectItem {
    pub fn location(&self) -> Option<NodeLocation> {
        match self {
            SelectItem::Single(item) => item.location(),
            SelectItem::All(item) => item.location(),
        }
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::Single(item) => match item.alias {
                Some(ref alias) => write!(f, "{} AS {}", item.expression, alias),
                None => write!(f, "{}", item.expression),
            },
            SelectItem::All(item) => match item.prefix {
                Some(ref prefix) => write!(f, "{}.*", prefix),
                None => write!(f, "*"),
            },
        }
    }
}

/// 单列：表达式加可选别名
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SingleColumn {
    pub(crate) location: Location,
    pub(crate) expression: Expression,
    pub(crate) alias: Option<String>,
}

impl SingleColumn {
    pub fn new(expression: Expression, alias: Option<String>) -> Self {
        Self {
            location: Location::NONE,
            expression,
            alias,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// 替换表达式，保留别名和位置
    pub fn copy_with_expression(&self, expression: Expression) -> Self {
        Self {
            location: self.location,
            expression,
            alias: self.alias.clone(),
        }
    }
}

/// `*` 或 `prefix.*`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllColumns {
    pub(crate) location: Location,
    pub(crate) prefix: Option<QualifiedName>,
}

impl AllColumns {
    pub fn new(prefix: Option<QualifiedName>) -> Self {
        Self {
            location: Location::NONE,
            prefix,
        }
    }

    pub fn prefix(&self) -> Option<&QualifiedName> {
        self.prefix.as_ref()
    }
}

impl From<SingleColumn> for SelectItem {
    fn from(node: SingleColumn) -> Self {
        SelectItem::Single(node)
    }
}

impl From<AllColumns> for SelectItem {
    fn from(node: AllColumns) -> Self {
        SelectItem::All(node)
    }
}

/// GROUP BY 子句
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupBy {
    pub(crate) location: Location,
    pub(crate) grouping_elements: Vec<GroupingElement>,
}

impl GroupBy {
    pub fn new(grouping_elements: Vec<GroupingElement>) -> Self {
        Self {
            location: Location::NONE,
            grouping_elements,
        }
    }

    pub fn grouping_elements(&self) -> &[GroupingElement] {
        &self.grouping_elements
    }

    /// 各分组元素展开结果的笛卡尔积，每个组合取并集
    ///
    /// 组合数超过 `MAX_GROUPING_SETS` 时返回错误。
    pub fn enumerate_grouping_sets(&self) -> AstResult<Vec<GroupingSet>> {
        let mut result: Vec<GroupingSet> = vec![GroupingSet::new()];
        for element in &self.grouping_elements {
            let element_sets = element.enumerate_grouping_sets()?;
            let total = result
                .len()
                .checked_mul(element_sets.len())
                .filter(|total| *total <= MAX_GROUPING_SETS)
                .ok_or_else(|| {
                    AstError::illegal_argument(format!(
                        "GROUP BY 展开的组合数超过上限 {}",
                        MAX_GROUPING_SETS
                    ))
                })?;
            let mut combined = Vec::with_capacity(total);
            for prefix in &result {
                for set in &element_sets {
                    let mut union = prefix.clone();
                    union.extend(set.iter().cloned());
                    combined.push(union);
                }
            }
            result = dedup_sets(combined);
        }
        Ok(result)
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements = self
            .grouping_elements
            .iter()
            .map(GroupingElement::format)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "GROUP BY {}", elements)
    }
}

/// 分组元素
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupingElement {
    Simple(SimpleGroupBy),
    Rollup(Rollup),
    Cube(Cube),
    GroupingSets(GroupingSets),
}

impl GroupingElement {
    pub fn location(&self) -> Option<NodeLocation> {
        match self {
            GroupingElement::Simple(e) => e.location(),
            GroupingElement::Rollup(e) => e.location(),
            GroupingElement::Cube(e) => e.location(),
            GroupingElement::GroupingSets(e) => e.location(),
        }
    }

    /// 展开为不同的分组列集合
    ///
    /// - 普通分组：一个集合，包含全部列
    /// - ROLLUP(c1..cn)：由长到短的前缀，最后是空集
    /// - CUBE(c1..cn)：不同列的幂集，按二进制计数顺序（空集在前）
    /// - GROUPING SETS：按声明顺序逐个给出
    ///
    /// 结果中重复的组合只保留第一次出现。CUBE 的不同列数超过
    /// `MAX_CUBE_COLUMNS` 时返回错误。
    pub fn enumerate_grouping_sets(&self) -> AstResult<Vec<GroupingSet>> {
        let sets = match self {
            GroupingElement::Simple(e) => vec![e.columns.iter().cloned().collect()],
            GroupingElement::Rollup(e) => {
                let sets = (0..=e.columns.len())
                    .rev()
                    .map(|len| e.columns[..len].iter().cloned().collect())
                    .collect();
                dedup_sets(sets)
            }
            GroupingElement::Cube(e) => {
                let distinct: Vec<&Expression> =
                    e.columns.iter().collect::<IndexSet<_>>().into_iter().collect();
                if distinct.len() > MAX_CUBE_COLUMNS {
                    return Err(AstError::illegal_argument(format!(
                        "CUBE 最多支持 {} 个不同的列, 实际为 {}",
                        MAX_CUBE_COLUMNS,
                        distinct.len()
                    )));
                }
                (0usize..(1usize << distinct.len()))
                    .map(|mask| {
                        distinct
                            .iter()
                            .enumerate()
                            .filter(|(bit, _)| mask & (1usize << bit) != 0)
                            .map(|(_, column)| (*column).clone())
                            .collect()
                    })
                    .collect()
            }
            GroupingElement::GroupingSets(e) => dedup_sets(
                e.sets
                    .iter()
                    .map(|set| set.iter().cloned().collect())
                    .collect(),
            ),
        };
        Ok(sets)
    }

    /// 格式化为 GROUP BY 中的文本
    pub fn format(&self) -> String {
        match self {
            GroupingElement::Simple(e) => join(&e.columns),
            GroupingElement::Rollup(e) => format!("ROLLUP ({})", join(&e.columns)),
            GroupingElement::Cube(e) => format!("CUBE ({})", join(&e.columns)),
            GroupingElement::GroupingSets(e) => {
                let sets = e
                    .sets
                    .iter()
                    .map(|set| format!("({})", join(set)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("GROUPING SETS ({})", sets)
            }
        }
    }
}

impl fmt::Display for GroupingElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

fn join(expressions: &[Expression]) -> String {
    expressions
        .iter()
        .map(|expression| expression.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 与元素顺序无关的集合哈希
fn set_hash(set: &GroupingSet) -> u64 {
    set.iter().fold(0u64, |acc, expression| {
        let mut hasher = DefaultHasher::new();
        expression.hash(&mut hasher);
        acc.wrapping_add(hasher.finish())
    })
}

/// 去掉重复的集合，保留第一次出现；按集合哈希分桶，只在桶内比较
fn dedup_sets(sets: Vec<GroupingSet>) -> Vec<GroupingSet> {
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::with_capacity(sets.len());
    let mut result: Vec<GroupingSet> = Vec::with_capacity(sets.len());
    for set in sets {
        let bucket = buckets.entry(set_hash(&set)).or_default();
        if bucket.iter().any(|&index| result[index] == set) {
            continue;
        }
        bucket.push(result.len());
        result.push(set);
    }
    result
}

/// 普通分组：`GROUP BY a, b`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleGroupBy {
    pub(crate) location: Location,
    pub(crate) columns: Vec<Expression>,
}

impl SimpleGroupBy {
    pub fn new(columns: Vec<Expression>) -> Self {
        Self {
            location: Location::NONE,
            columns,
        }
    }

    pub fn columns(&self) -> &[Expression] {
        &self.columns
    }
}

/// `ROLLUP (a, b)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rollup {
    pub(crate) location: Location,
    pub(crate) columns: Vec<Expression>,
}

impl Rollup {
    pub fn new(columns: Vec<Expression>) -> Self {
        Self {
            location: Location::NONE,
            columns,
        }
    }

    pub fn columns(&self) -> &[Expression] {
        &self.columns
    }
}

/// `CUBE (a, b)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CubeSerde")]
pub struct Cube {
    pub(crate) location: Location,
    pub(crate) columns: Vec<Expression>,
}

impl Cube {
    /// 不同列数不能超过 `MAX_CUBE_COLUMNS`
    pub fn new(columns: Vec<Expression>) -> AstResult<Self> {
        let distinct = columns.iter().collect::<IndexSet<_>>().len();
        if distinct > MAX_CUBE_COLUMNS {
            return Err(AstError::illegal_argument(format!(
                "CUBE 最多支持 {} 个不同的列, 实际为 {}",
                MAX_CUBE_COLUMNS, distinct
            )));
        }
        Ok(Self {
            location: Location::NONE,
            columns,
        })
    }

    pub fn columns(&self) -> &[Expression] {
        &self.columns
    }
}

validated_serde!(Cube as CubeSerde {
    columns: Vec<Expression>,
} => |raw| Cube::new(raw.columns));

/// `GROUPING SETS ((a, b), (a), ())`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupingSets {
    pub(crate) location: Location,
    pub(crate) sets: Vec<Vec<Expression>>,
}

impl GroupingSets {
    pub fn new(sets: Vec<Vec<Expression>>) -> Self {
        Self {
            location: Location::NONE,
            sets,
        }
    }

    pub fn sets(&self) -> &[Vec<Expression>] {
        &self.sets
    }
}

impl_located!(
    Query,
    Select,
    SingleColumn,
    AllColumns,
    GroupBy,
    SimpleGroupBy,
    Rollup,
    Cube,
    GroupingSets,
);

impl From<SimpleGroupBy> for GroupingElement {
    fn from(node: SimpleGroupBy) -> Self {
        GroupingElement::Simple(node)
    }
}

impl From<Rollup> for GroupingElement {
    fn from(node: Rollup) -> Self {
        GroupingElement::Rollup(node)
    }
}

impl From<Cube> for GroupingElement {
    fn from(node: Cube) -> Self {
        GroupingElement::Cube(node)
    }
}

impl From<GroupingSets> for GroupingElement {
    fn from(node: GroupingSets) -> Self {
        GroupingElement::GroupingSets(node)
    }
}
