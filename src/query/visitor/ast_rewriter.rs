//! AST 重写器（AstRewriter）
//!
//! 以所有权方式重建整棵树：每个复合节点的子节点先被 `process`，
//! 再用重写后的子节点和原样复制的标量字段构造恰好一个新节点，位置保持不变。
//!
//! 扩展方式：
//! - 覆盖某个 `visit_*`，替换该类节点的处理逻辑（不调用子节点处理即放弃下降）
//! - 覆盖 `process`，在任意节点前后插入逻辑
//!
//! 子节点处理后通过 `TryFrom<AstNode>` 做类型检查，类型不符返回
//! `RewriteError::UnexpectedNode`。

use crate::core::{RewriteError, RewriteResult};
use crate::query::ast::*;
use log::debug;

fn expression<E: Into<Expression>>(node: E) -> AstNode {
    AstNode::Expression(node.into())
}

fn statement<S: Into<Statement>>(node: S) -> AstNode {
    AstNode::Statement(node.into())
}

fn relation<R: Into<Relation>>(node: R) -> AstNode {
    AstNode::Relation(node.into())
}

fn select_item<S: Into<SelectItem>>(node: S) -> AstNode {
    AstNode::SelectItem(node.into())
}

fn grouping_element<G: Into<GroupingElement>>(node: G) -> AstNode {
    AstNode::GroupingElement(node.into())
}

/// 通用 AST 重写器
///
/// `C` 为调用方提供的上下文，只读地传给每一次处理。
pub trait AstRewriter<C> {
    /// 处理一个节点，默认直接分派
    fn process(&mut self, node: AstNode, ctx: &C) -> RewriteResult<AstNode> {
        self.dispatch(node, ctx)
    }

    /// 处理子节点并检查结果类型
    fn process_as<T>(&mut self, node: T, ctx: &C) -> RewriteResult<T>
    where
        T: Into<AstNode> + TryFrom<AstNode, Error = RewriteError>,
    {
        let processed = self.process(node.into(), ctx)?;
        T::try_from(processed)
    }

    fn process_boxed(&mut self, node: Box<Expression>, ctx: &C) -> RewriteResult<Box<Expression>> {
        self.process_as(*node, ctx).map(Box::new)
    }

    /// 逐个处理，保持顺序和数量
    fn process_all<T>(&mut self, nodes: Vec<T>, ctx: &C) -> RewriteResult<Vec<T>>
    where
        T: Into<AstNode> + TryFrom<AstNode, Error = RewriteError>,
    {
        nodes
            .into_iter()
            .map(|node| self.process_as(node, ctx))
            .collect()
    }

    /// 仅在存在时处理
    fn process_optional<T>(&mut self, node: Option<T>, ctx: &C) -> RewriteResult<Option<T>>
    where
        T: Into<AstNode> + TryFrom<AstNode, Error = RewriteError>,
    {
        node.map(|node| self.process_as(node, ctx)).transpose()
    }

    /// 按具体节点类型分派到对应的 `visit_*`
    fn dispatch(&mut self, node: AstNode, ctx: &C) -> RewriteResult<AstNode> {
        match node {
            AstNode::Statement(s) => match s {
                Statement::Statements(n) => self.visit_statements(n, ctx),
                Statement::CreateStream(n) => self.visit_create_stream(n, ctx),
                Statement::CreateTable(n) => self.visit_create_table(n, ctx),
                Statement::CreateStreamAsSelect(n) => self.visit_create_stream_as_select(n, ctx),
                Statement::CreateTableAsSelect(n) => self.visit_create_table_as_select(n, ctx),
                Statement::InsertInto(n) => self.visit_insert_into(n, ctx),
                Statement::DropTable(n) => self.visit_drop_table(n, ctx),
                Statement::CreateConnector(n) => self.visit_create_connector(n, ctx),
                Statement::Query(n) => self.visit_query(n, ctx),
            },
            AstNode::Expression(e) => match e {
                Expression::ArithmeticBinary(n) => self.visit_arithmetic_binary(n, ctx),
                Expression::ArithmeticUnary(n) => self.visit_arithmetic_unary(n, ctx),
                Expression::Comparison(n) => self.visit_comparison(n, ctx),
                Expression::LogicalBinary(n) => self.visit_logical_binary(n, ctx),
                Expression::Between(n) => self.visit_between(n, ctx),
                Expression::In(n) => self.visit_in_predicate(n, ctx),
                Expression::InList(n) => self.visit_in_list(n, ctx),
                Expression::Like(n) => self.visit_like(n, ctx),
                Expression::IsNull(n) => self.visit_is_null(n, ctx),
                Expression::IsNotNull(n) => self.visit_is_not_null(n, ctx),
                Expression::Not(n) => self.visit_not(n, ctx),
                Expression::FunctionCall(n) => self.visit_function_call(n, ctx),
                Expression::Cast(n) => self.visit_cast(n, ctx),
                Expression::Dereference(n) => self.visit_dereference(n, ctx),
                Expression::Subscript(n) => self.visit_subscript(n, ctx),
                Expression::SimpleCase(n) => self.visit_simple_case(n, ctx),
                Expression::SearchedCase(n) => self.visit_searched_case(n, ctx),
                Expression::WhenClause(n) => self.visit_when_clause(n, ctx),
                Expression::QualifiedNameReference(n) => {
                    self.visit_qualified_name_reference(n, ctx)
                }
                Expression::Literal(n) => self.visit_literal(n, ctx),
            },
            AstNode::Relation(r) => match r {
                Relation::Table(n) => self.visit_table(n, ctx),
                Relation::Aliased(n) => self.visit_aliased_relation(n, ctx),
                Relation::Join(n) => self.visit_join(n, ctx),
            },
            AstNode::Select(n) => self.visit_select(n, ctx),
            AstNode::SelectItem(item) => match item {
                SelectItem::Single(n) => self.visit_single_column(n, ctx),
                SelectItem::All(n) => self.visit_all_columns(n, ctx),
            },
            AstNode::GroupBy(n) => self.visit_group_by(n, ctx),
            AstNode::GroupingElement(element) => match element {
                GroupingElement::Simple(n) => self.visit_simple_group_by(n, ctx),
                GroupingElement::Rollup(n) => self.visit_rollup(n, ctx),
                GroupingElement::Cube(n) => self.visit_cube(n, ctx),
                GroupingElement::GroupingSets(n) => self.visit_grouping_sets(n, ctx),
            },
            AstNode::WindowExpression(n) => self.visit_window_expression(n, ctx),
            AstNode::KsqlWindowExpression(n) => self.visit_ksql_window_expression(n, ctx),
            AstNode::WithinExpression(n) => self.visit_within_expression(n, ctx),
            AstNode::TableElement(n) => self.visit_table_element(n, ctx),
        }
    }

    /// 重写整棵树，输入不会被修改
    fn rewrite(&mut self, root: &AstNode, ctx: &C) -> RewriteResult<AstNode> {
        debug!("开始重写, 根节点类型: {}", root.kind());
        let result = self.process(root.clone(), ctx)?;
        debug!("重写完成, 根节点类型: {}", result.kind());
        Ok(result)
    }

    /// 重写语句，结果必须仍是语句
    fn rewrite_statement(&mut self, root: &Statement, ctx: &C) -> RewriteResult<Statement> {
        let result = self.rewrite(&AstNode::Statement(root.clone()), ctx)?;
        Statement::try_from(result)
    }

    // ==================== 语句 ====================

    fn visit_statements(&mut self, node: Statements, ctx: &C) -> RewriteResult<AstNode> {
        let Statements {
            location,
            statements,
        } = node;
        let statements = self.process_all(statements, ctx)?;
        Ok(statement(Statements {
            location,
            statements,
        }))
    }

    fn visit_create_stream(&mut self, node: CreateStream, ctx: &C) -> RewriteResult<AstNode> {
        let CreateStream {
            location,
            name,
            elements,
            not_exists,
            properties,
        } = node;
        let elements = TableElements::of(self.process_all(elements.into_iter().collect(), ctx)?);
        Ok(statement(CreateStream {
            location,
            name,
            elements,
            not_exists,
            properties,
        }))
    }

    fn visit_create_table(&mut self, node: CreateTable, ctx: &C) -> RewriteResult<AstNode> {
        let CreateTable {
            location,
            name,
            elements,
            not_exists,
            properties,
        } = node;
        let elements = TableElements::of(self.process_all(elements.into_iter().collect(), ctx)?);
        Ok(statement(CreateTable {
            location,
            name,
            elements,
            not_exists,
            properties,
        }))
    }

    fn visit_create_stream_as_select(
        &mut self,
        node: CreateStreamAsSelect,
        ctx: &C,
    ) -> RewriteResult<AstNode> {
        let CreateStreamAsSelect {
            location,
            name,
            query,
            not_exists,
            properties,
            partition_by,
        } = node;
        let query = self.process_as(query, ctx)?;
        let partition_by = self.process_optional(partition_by, ctx)?;
        Ok(statement(CreateStreamAsSelect {
            location,
            name,
            query,
            not_exists,
            properties,
            partition_by,
        }))
    }

    fn visit_create_table_as_select(
        &mut self,
        node: CreateTableAsSelect,
        ctx: &C,
    ) -> RewriteResult<AstNode> {
        let CreateTableAsSelect {
            location,
            name,
            query,
            not_exists,
            properties,
        } = node;
        let query = self.process_as(query, ctx)?;
        Ok(statement(CreateTableAsSelect {
            location,
            name,
            query,
            not_exists,
            properties,
        }))
    }

    fn visit_insert_into(&mut self, node: InsertInto, ctx: &C) -> RewriteResult<AstNode> {
        let InsertInto {
            location,
            target,
            query,
            partition_by,
        } = node;
        let query = self.process_as(query, ctx)?;
        let partition_by = self.process_optional(partition_by, ctx)?;
        Ok(statement(InsertInto {
            location,
            target,
            query,
            partition_by,
        }))
    }

    fn visit_drop_table(&mut self, node: DropTable, _ctx: &C) -> RewriteResult<AstNode> {
        Ok(statement(node))
    }

    /// 连接器配置不作为子节点处理
    fn visit_create_connector(&mut self, node: CreateConnector, _ctx: &C) -> RewriteResult<AstNode> {
        Ok(statement(node))
    }

    fn visit_query(&mut self, node: Query, ctx: &C) -> RewriteResult<AstNode> {
        let Query {
            location,
            select,
            from,
            window,
            where_clause,
            group_by,
            having,
            limit,
        } = node;
        let select = self.process_as(select, ctx)?;
        let from = self.process_as(from, ctx)?;
        let window = self.process_optional(window, ctx)?;
        let where_clause = self.process_optional(where_clause, ctx)?;
        let group_by = self.process_optional(group_by, ctx)?;
        let having = self.process_optional(having, ctx)?;
        Ok(statement(Query {
            location,
            select,
            from,
            window,
            where_clause,
            group_by,
            having,
            limit,
        }))
    }

    // ==================== 表达式 ====================

    fn visit_arithmetic_binary(
        &mut self,
        node: ArithmeticBinaryExpression,
        ctx: &C,
    ) -> RewriteResult<AstNode> {
        let ArithmeticBinaryExpression {
            location,
            operator,
            left,
            right,
        } = node;
        let left = self.process_boxed(left, ctx)?;
        let right = self.process_boxed(right, ctx)?;
        Ok(expression(ArithmeticBinaryExpression {
            location,
            operator,
            left,
            right,
        }))
    }

    fn visit_arithmetic_unary(
        &mut self,
        node: ArithmeticUnaryExpression,
        ctx: &C,
    ) -> RewriteResult<AstNode> {
        let ArithmeticUnaryExpression {
            location,
            sign,
            value,
        } = node;
        let value = self.process_boxed(value, ctx)?;
        Ok(expression(ArithmeticUnaryExpression {
            location,
            sign,
            value,
        }))
    }

    fn visit_comparison(&mut self, node: ComparisonExpression, ctx: &C) -> RewriteResult<AstNode> {
        let ComparisonExpression {
            location,
            operator,
            left,
            right,
        } = node;
        let left = self.process_boxed(left, ctx)?;
        let right = self.process_boxed(right, ctx)?;
        Ok(expression(ComparisonExpression {
            location,
            operator,
            left,
            right,
        }))
    }

    fn visit_logical_binary(
        &mut self,
        node: LogicalBinaryExpression,
        ctx: &C,
    ) -> RewriteResult<AstNode> {
        let LogicalBinaryExpression {
            location,
            operator,
            left,
            right,
        } = node;
        let left = self.process_boxed(left, ctx)?;
        let right = self.process_boxed(right, ctx)?;
        Ok(expression(LogicalBinaryExpression {
            location,
            operator,
            left,
            right,
        }))
    }

    fn visit_between(&mut self, node: BetweenPredicate, ctx: &C) -> RewriteResult<AstNode> {
        let BetweenPredicate {
            location,
            value,
            min,
            max,
        } = node;
        let value = self.process_boxed(value, ctx)?;
        let min = self.process_boxed(min, ctx)?;
        let max = self.process_boxed(max, ctx)?;
        Ok(expression(BetweenPredicate {
            location,
            value,
            min,
            max,
        }))
    }

    fn visit_in_predicate(&mut self, node: InPredicate, ctx: &C) -> RewriteResult<AstNode> {
        let InPredicate {
            location,
            value,
            value_list,
        } = node;
        let value = self.process_boxed(value, ctx)?;
        let value_list = self.process_as(value_list, ctx)?;
        Ok(expression(InPredicate {
            location,
            value,
            value_list,
        }))
    }

    fn visit_in_list(&mut self, node: InListExpression, ctx: &C) -> RewriteResult<AstNode> {
        let InListExpression { location, values } = node;
        let values = self.process_all(values, ctx)?;
        Ok(expression(InListExpression { location, values }))
    }

    fn visit_like(&mut self, node: LikePredicate, ctx: &C) -> RewriteResult<AstNode> {
        let LikePredicate {
            location,
            value,
            pattern,
        } = node;
        let value = self.process_boxed(value, ctx)?;
        let pattern = self.process_boxed(pattern, ctx)?;
        Ok(expression(LikePredicate {
            location,
            value,
            pattern,
        }))
    }

    fn visit_is_null(&mut self, node: IsNullPredicate, ctx: &C) -> RewriteResult<AstNode> {
        let IsNullPredicate { location, value } = node;
        let value = self.process_boxed(value, ctx)?;
        Ok(expression(IsNullPredicate { location, value }))
    }

    fn visit_is_not_null(&mut self, node: IsNotNullPredicate, ctx: &C) -> RewriteResult<AstNode> {
        let IsNotNullPredicate { location, value } = node;
        let value = self.process_boxed(value, ctx)?;
        Ok(expression(IsNotNullPredicate { location, value }))
    }

    fn visit_not(&mut self, node: NotExpression, ctx: &C) -> RewriteResult<AstNode> {
        let NotExpression { location, value } = node;
        let value = self.process_boxed(value, ctx)?;
        Ok(expression(NotExpression { location, value }))
    }

    fn visit_function_call(&mut self, node: FunctionCall, ctx: &C) -> RewriteResult<AstNode> {
        let FunctionCall {
            location,
            name,
            arguments,
        } = node;
        let arguments = self.process_all(arguments, ctx)?;
        Ok(expression(FunctionCall {
            location,
            name,
            arguments,
        }))
    }

    fn visit_cast(&mut self, node: Cast, ctx: &C) -> RewriteResult<AstNode> {
        let Cast {
            location,
            expression: inner,
            target_type,
        } = node;
        let inner = self.process_boxed(inner, ctx)?;
        Ok(expression(Cast {
            location,
            expression: inner,
            target_type,
        }))
    }

    fn visit_dereference(
        &mut self,
        node: DereferenceExpression,
        ctx: &C,
    ) -> RewriteResult<AstNode> {
        let DereferenceExpression {
            location,
            base,
            field_name,
        } = node;
        let base = self.process_boxed(base, ctx)?;
        Ok(expression(DereferenceExpression {
            location,
            base,
            field_name,
        }))
    }

    fn visit_subscript(&mut self, node: SubscriptExpression, ctx: &C) -> RewriteResult<AstNode> {
        let SubscriptExpression {
            location,
            base,
            index,
        } = node;
        let base = self.process_boxed(base, ctx)?;
        let index = self.process_boxed(index, ctx)?;
        Ok(expression(SubscriptExpression {
            location,
            base,
            index,
        }))
    }

    fn visit_simple_case(&mut self, node: SimpleCaseExpression, ctx: &C) -> RewriteResult<AstNode> {
        let SimpleCaseExpression {
            location,
            operand,
            when_clauses,
            default_value,
        } = node;
        let operand = self.process_boxed(operand, ctx)?;
        let when_clauses = self.process_all(when_clauses, ctx)?;
        let default_value = default_value
            .map(|value| self.process_boxed(value, ctx))
            .transpose()?;
        Ok(expression(SimpleCaseExpression {
            location,
            operand,
            when_clauses,
            default_value,
        }))
    }

    fn visit_searched_case(
        &mut self,
        node: SearchedCaseExpression,
        ctx: &C,
    ) -> RewriteResult<AstNode> {
        let SearchedCaseExpression {
            location,
            when_clauses,
            default_value,
        } = node;
        let when_clauses = self.process_all(when_clauses, ctx)?;
        let default_value = default_value
            .map(|value| self.process_boxed(value, ctx))
            .transpose()?;
        Ok(expression(SearchedCaseExpression {
            location,
            when_clauses,
            default_value,
        }))
    }

    fn visit_when_clause(&mut self, node: WhenClause, ctx: &C) -> RewriteResult<AstNode> {
        let WhenClause {
            location,
            operand,
            result,
        } = node;
        let operand = self.process_boxed(operand, ctx)?;
        let result = self.process_boxed(result, ctx)?;
        Ok(expression(WhenClause {
            location,
            operand,
            result,
        }))
    }

    fn visit_qualified_name_reference(
        &mut self,
        node: QualifiedNameReference,
        _ctx: &C,
    ) -> RewriteResult<AstNode> {
        Ok(expression(node))
    }

    fn visit_literal(&mut self, node: LiteralExpression, _ctx: &C) -> RewriteResult<AstNode> {
        Ok(expression(node))
    }

    // ==================== 关系 ====================

    fn visit_table(&mut self, node: Table, _ctx: &C) -> RewriteResult<AstNode> {
        Ok(relation(node))
    }

    fn visit_aliased_relation(&mut self, node: AliasedRelation, ctx: &C) -> RewriteResult<AstNode> {
        let AliasedRelation {
            location,
            relation: inner,
            alias,
        } = node;
        let inner = Box::new(self.process_as(*inner, ctx)?);
        Ok(relation(AliasedRelation {
            location,
            relation: inner,
            alias,
        }))
    }

    /// 连接条件原样复制
    fn visit_join(&mut self, node: Join, ctx: &C) -> RewriteResult<AstNode> {
        let Join {
            location,
            join_type,
            left,
            right,
            criteria,
            within,
        } = node;
        let left = Box::new(self.process_as(*left, ctx)?);
        let right = Box::new(self.process_as(*right, ctx)?);
        let within = self.process_optional(within, ctx)?;
        Ok(relation(Join {
            location,
            join_type,
            left,
            right,
            criteria,
            within,
        }))
    }

    // ==================== 查询结构 ====================

    fn visit_select(&mut self, node: Select, ctx: &C) -> RewriteResult<AstNode> {
        let Select {
            location,
            select_items,
        } = node;
        let select_items = self.process_all(select_items, ctx)?;
        Ok(AstNode::Select(Select {
            location,
            select_items,
        }))
    }

    fn visit_single_column(&mut self, node: SingleColumn, ctx: &C) -> RewriteResult<AstNode> {
        let SingleColumn {
            location,
            expression: inner,
            alias,
        } = node;
        let inner = self.process_as(inner, ctx)?;
        Ok(select_item(SingleColumn {
            location,
            expression: inner,
            alias,
        }))
    }

    fn visit_all_columns(&mut self, node: AllColumns, _ctx: &C) -> RewriteResult<AstNode> {
        Ok(select_item(node))
    }

    fn visit_group_by(&mut self, node: GroupBy, ctx: &C) -> RewriteResult<AstNode> {
        let GroupBy {
            location,
            grouping_elements,
        } = node;
        let grouping_elements = self.process_all(grouping_elements, ctx)?;
        Ok(AstNode::GroupBy(GroupBy {
            location,
            grouping_elements,
        }))
    }

    fn visit_simple_group_by(&mut self, node: SimpleGroupBy, ctx: &C) -> RewriteResult<AstNode> {
        let SimpleGroupBy { location, columns } = node;
        let columns = self.process_all(columns, ctx)?;
        Ok(grouping_element(SimpleGroupBy { location, columns }))
    }

    fn visit_rollup(&mut self, node: Rollup, ctx: &C) -> RewriteResult<AstNode> {
        let Rollup { location, columns } = node;
        let columns = self.process_all(columns, ctx)?;
        Ok(grouping_element(Rollup { location, columns }))
    }

    /// 重写后的列数仍需满足 CUBE 的上限
    fn visit_cube(&mut self, node: Cube, ctx: &C) -> RewriteResult<AstNode> {
        let Cube { location, columns } = node;
        let columns = self.process_all(columns, ctx)?;
        let cube = Cube::new(columns)?.with_location(location);
        Ok(grouping_element(cube))
    }

    fn visit_grouping_sets(&mut self, node: GroupingSets, ctx: &C) -> RewriteResult<AstNode> {
        let GroupingSets { location, sets } = node;
        let sets = sets
            .into_iter()
            .map(|set| self.process_all(set, ctx))
            .collect::<RewriteResult<Vec<_>>>()?;
        Ok(grouping_element(GroupingSets { location, sets }))
    }

    fn visit_window_expression(
        &mut self,
        node: WindowExpression,
        ctx: &C,
    ) -> RewriteResult<AstNode> {
        let WindowExpression {
            location,
            window_name,
            window,
        } = node;
        let window = self.process_as(window, ctx)?;
        Ok(AstNode::WindowExpression(WindowExpression {
            location,
            window_name,
            window,
        }))
    }

    fn visit_ksql_window_expression(
        &mut self,
        node: KsqlWindowExpression,
        _ctx: &C,
    ) -> RewriteResult<AstNode> {
        Ok(AstNode::KsqlWindowExpression(node))
    }

    fn visit_within_expression(
        &mut self,
        node: WithinExpression,
        _ctx: &C,
    ) -> RewriteResult<AstNode> {
        Ok(AstNode::WithinExpression(node))
    }

    fn visit_table_element(&mut self, node: TableElement, _ctx: &C) -> RewriteResult<AstNode> {
        Ok(AstNode::TableElement(node))
    }
}

/// 不覆盖任何方法的重写器，结果与输入结构相等
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRewriter;

impl<C> AstRewriter<C> for DefaultRewriter {}

impl DefaultRewriter {
    pub fn new() -> Self {
        Self
    }
}

/// 用默认重写器重写整棵树
pub fn rewrite<C>(root: &AstNode, ctx: &C) -> RewriteResult<AstNode> {
    DefaultRewriter.rewrite(root, ctx)
}
