//! The tree-walking evaluator.
//!
//! One `Evaluator` per independent evaluation; it is deliberately
//! cheap to build. It holds the injected host accessor, the frame
//! stack, and the function table accumulated while a script runs.
//! Expression evaluation returns values; statement execution returns
//! `Flow`, and only the construct that owns a control signal consumes
//! it.

use mel_ir::{
    BinaryOp, Expr, ExprKind, FuncDecl, InitEntry, Interner, Name, Program, Stmt, StmtKind,
    SwitchCase, TypeRef, UnaryOp,
};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{
    arity_mismatch, condition_not_boolean, not_callable, not_iterable, stray_loop_signal,
    undefined_function, undefined_variable, yield_outside_iterator, EvalError, EvalResult,
};
use crate::flow::Flow;
use crate::format::format_template;
use crate::frame::{FrameFlags, FrameStack};
use crate::host::HostAccessor;
use crate::operators;
use crate::stack::ensure_sufficient_stack;
use crate::value::{TypeHandle, Value};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;

/// A script-declared function: borrowed views into the program tree.
#[derive(Clone, Copy, Debug)]
pub struct FunctionDef<'a> {
    pub params: &'a [mel_ir::Param],
    pub body: &'a [Stmt],
}

/// Conventional operator-overload method name, for host dispatch.
fn operator_method(op: BinaryOp) -> Option<&'static str> {
    Some(match op {
        BinaryOp::Add => "op_add",
        BinaryOp::Sub => "op_sub",
        BinaryOp::Mul => "op_mul",
        BinaryOp::Div => "op_div",
        BinaryOp::Mod => "op_mod",
        BinaryOp::BitAnd => "op_bitand",
        BinaryOp::BitOr => "op_bitor",
        BinaryOp::BitXor => "op_bitxor",
        BinaryOp::Shl => "op_shl",
        BinaryOp::Shr => "op_shr",
        BinaryOp::Eq => "op_eq",
        BinaryOp::NotEq => "op_ne",
        BinaryOp::Lt => "op_lt",
        BinaryOp::LtEq => "op_le",
        BinaryOp::Gt => "op_gt",
        BinaryOp::GtEq => "op_ge",
        BinaryOp::And | BinaryOp::Or | BinaryOp::Coalesce => return None,
    })
}

/// An evaluated assignment target: where a value will be written.
enum Place {
    Var(Name),
    Member { target: Option<Value>, name: Name },
    Index { target: Value, args: Vec<Value> },
}

/// The evaluator for one program run.
pub struct Evaluator<'a> {
    host: &'a dyn HostAccessor,
    interner: &'a Interner,
    frames: FrameStack,
    functions: FxHashMap<Name, FunctionDef<'a>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(host: &'a dyn HostAccessor, interner: &'a Interner) -> Self {
        Evaluator {
            host,
            interner,
            frames: FrameStack::new(),
            functions: FxHashMap::default(),
        }
    }

    /// Pre-bind a root variable; used by embeddings to pass values in
    /// (event handlers bind `$sender` and `$args` this way).
    pub fn bind(&mut self, name: Name, value: Value) {
        self.frames.define(name, value);
    }

    /// Run a parsed program to its result value.
    ///
    /// Expression programs yield their value. Script programs yield
    /// the value of a top-level `return`, or null when execution falls
    /// off the end. A `break` or `continue` reaching this boundary is
    /// a control-flow-misuse error.
    pub fn run(&mut self, program: &'a Program) -> EvalResult {
        match program {
            Program::Expr(expr) => self.eval_expr(expr),
            Program::Script(stmts) => match self.exec_block(stmts)? {
                Flow::Return(value) => Ok(value),
                Flow::Normal => Ok(Value::Null),
                Flow::Break => Err(stray_loop_signal("break")),
                Flow::Continue => Err(stray_loop_signal("continue")),
            },
        }
    }

    fn lookup_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    // Expressions

    fn eval_expr(&mut self, expr: &'a Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &'a Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(n) => Ok(Value::Float(*n)),
            ExprKind::Str(name) => Ok(Value::str(self.lookup_str(*name))),
            ExprKind::Variable(name) => self.eval_variable(*name),
            ExprKind::Context => Ok(self.host.context()),
            ExprKind::Member { target, name } => {
                let target = match target {
                    Some(t) => self.eval_expr(t)?,
                    None => self.host.context(),
                };
                self.host.get_property(&target, self.lookup_str(*name))
            }
            ExprKind::Index { target, args } => {
                let target = self.eval_expr(target)?;
                let args = self.eval_args(args)?;
                self.host.get_item(&target, &args)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                match op {
                    UnaryOp::Neg => operators::evaluate_neg(&operand),
                    UnaryOp::Not => operators::evaluate_not(&operand),
                    UnaryOp::BitNot => operators::evaluate_bit_not(&operand),
                }
            }
            ExprKind::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs),
            ExprKind::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_condition(cond)? {
                    self.eval_expr(then_branch)
                } else {
                    self.eval_expr(else_branch)
                }
            }
            ExprKind::Sequence(items) => {
                let mut last = Value::Null;
                for item in items {
                    last = self.eval_expr(item)?;
                }
                Ok(last)
            }
            ExprKind::Assign { op, target, value } => self.eval_assign(*op, target, value),
            ExprKind::IncDec {
                increment,
                prefix,
                target,
            } => self.eval_inc_dec(*increment, *prefix, target),
            ExprKind::Call { callee, args } => self.eval_call(callee, args),
            ExprKind::TypeLit(ty) => Ok(Value::Type(self.resolve_type_ref(ty)?)),
            ExprKind::New { ty, args, init } => self.eval_new(ty, args, init),
            ExprKind::Format { args } => {
                let template = self.eval_expr(&args[0])?;
                let rest = self.eval_args(&args[1..])?;
                match template {
                    Value::Str(text) => format_template(&text, &rest).map(Value::str),
                    other => Err(crate::error::conversion_failed(&other, "format template")),
                }
            }
            ExprKind::IteratorBlock { ty, body } => self.eval_iterator_block(ty.as_ref(), body),
            ExprKind::BlockExpr { body } => self.eval_block_expr(body),
        }
    }

    fn eval_variable(&mut self, name: Name) -> EvalResult {
        if let Some(value) = self.frames.lookup(name) {
            return Ok(value.clone());
        }
        if self.functions.contains_key(&name) {
            return Ok(Value::Function(name));
        }
        Err(undefined_variable(self.lookup_str(name)))
    }

    fn eval_condition(&mut self, expr: &'a Expr) -> Result<bool, EvalError> {
        let value = self.eval_expr(expr)?;
        value.as_condition().ok_or_else(|| condition_not_boolean(&value))
    }

    fn eval_args(&mut self, exprs: &'a [Expr]) -> Result<Vec<Value>, EvalError> {
        exprs.iter().map(|e| self.eval_expr(e)).collect()
    }

    fn eval_binary(&mut self, op: BinaryOp, lhs: &'a Expr, rhs: &'a Expr) -> EvalResult {
        // The lazy operators never evaluate their right operand
        // eagerly; everything else evaluates both before dispatch.
        match op {
            BinaryOp::And => {
                if !self.eval_condition(lhs)? {
                    return Ok(Value::Bool(false));
                }
                return Ok(Value::Bool(self.eval_condition(rhs)?));
            }
            BinaryOp::Or => {
                if self.eval_condition(lhs)? {
                    return Ok(Value::Bool(true));
                }
                return Ok(Value::Bool(self.eval_condition(rhs)?));
            }
            BinaryOp::Coalesce => {
                let left = self.eval_expr(lhs)?;
                if left.is_null() {
                    return self.eval_expr(rhs);
                }
                return Ok(left);
            }
            _ => {}
        }
        let left = self.eval_expr(lhs)?;
        let right = self.eval_expr(rhs)?;
        self.apply_binary(op, left, right)
    }

    /// Shared binary dispatch path: null-equality short-circuit, host
    /// operator overloads, scalar fallback.
    fn apply_binary(&mut self, op: BinaryOp, left: Value, right: Value) -> EvalResult {
        if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) && (left.is_null() || right.is_null()) {
            let equal = left.is_null() && right.is_null();
            return Ok(Value::Bool(if op == BinaryOp::Eq { equal } else { !equal }));
        }
        if let (Value::Object(_), Some(method)) = (&left, operator_method(op)) {
            if let Some(result) =
                self.host
                    .invoke_operator(method, &left, std::slice::from_ref(&right))
            {
                return result;
            }
        }
        operators::evaluate_binary(op, &left, &right)
    }

    // Assignment targets

    fn resolve_place(&mut self, target: &'a Expr) -> Result<Place, EvalError> {
        match &target.kind {
            ExprKind::Variable(name) => Ok(Place::Var(*name)),
            ExprKind::Member { target, name } => {
                let target = match target {
                    Some(t) => Some(self.eval_expr(t)?),
                    None => None,
                };
                Ok(Place::Member {
                    target,
                    name: *name,
                })
            }
            ExprKind::Index { target, args } => {
                let target = self.eval_expr(target)?;
                let args = self.eval_args(args)?;
                Ok(Place::Index { target, args })
            }
            _ => Err(crate::error::not_assignable()),
        }
    }

    fn read_place(&mut self, place: &Place) -> EvalResult {
        match place {
            Place::Var(name) => self.eval_variable(*name),
            Place::Member { target, name } => {
                let target = target.clone().unwrap_or_else(|| self.host.context());
                self.host.get_property(&target, self.lookup_str(*name))
            }
            Place::Index { target, args } => self.host.get_item(target, args),
        }
    }

    fn write_place(&mut self, place: &Place, value: Value) -> Result<(), EvalError> {
        match place {
            Place::Var(name) => {
                self.frames.assign(*name, value);
                Ok(())
            }
            Place::Member { target, name } => {
                let target = target.clone().unwrap_or_else(|| self.host.context());
                self.host.set_property(&target, self.lookup_str(*name), value)
            }
            Place::Index { target, args } => self.host.set_item(target, args, value),
        }
    }

    fn eval_assign(
        &mut self,
        op: Option<BinaryOp>,
        target: &'a Expr,
        value: &'a Expr,
    ) -> EvalResult {
        let place = self.resolve_place(target)?;
        let new = match op {
            None => self.eval_expr(value)?,
            Some(op) => {
                let current = self.read_place(&place)?;
                let rhs = self.eval_expr(value)?;
                self.apply_binary(op, current, rhs)?
            }
        };
        self.write_place(&place, new.clone())?;
        Ok(new)
    }

    fn eval_inc_dec(&mut self, increment: bool, prefix: bool, target: &'a Expr) -> EvalResult {
        let place = self.resolve_place(target)?;
        let old = self.read_place(&place)?;
        let op = if increment { BinaryOp::Add } else { BinaryOp::Sub };
        let new = self.apply_binary(op, old.clone(), Value::Int(1))?;
        self.write_place(&place, new.clone())?;
        Ok(if prefix { new } else { old })
    }

    // Calls

    fn eval_call(&mut self, callee: &'a Expr, args: &'a [Expr]) -> EvalResult {
        match &callee.kind {
            ExprKind::Variable(name) => {
                // A local may shadow a declared function with a
                // function value of its own.
                match self.frames.lookup(*name).cloned() {
                    Some(Value::Function(target)) => {
                        let args = self.eval_args(args)?;
                        self.call_function(target, args)
                    }
                    Some(other) => Err(not_callable(&other)),
                    None if self.functions.contains_key(name) => {
                        let args = self.eval_args(args)?;
                        self.call_function(*name, args)
                    }
                    None => Err(undefined_function(self.lookup_str(*name))),
                }
            }
            ExprKind::Member { target, name } => {
                let name = self.lookup_str(*name);
                match target {
                    Some(t) => {
                        let target = self.eval_expr(t)?;
                        let args = self.eval_args(args)?;
                        if let Value::Type(handle) = target {
                            self.host.invoke_static(handle, name, args)
                        } else {
                            self.host.invoke_method(&target, name, args)
                        }
                    }
                    None => {
                        let context = self.host.context();
                        let args = self.eval_args(args)?;
                        self.host.invoke_method(&context, name, args)
                    }
                }
            }
            _ => {
                let callee = self.eval_expr(callee)?;
                match callee {
                    Value::Function(name) => {
                        let args = self.eval_args(args)?;
                        self.call_function(name, args)
                    }
                    other => Err(not_callable(&other)),
                }
            }
        }
    }

    /// Invoke a script-declared function: scope-boundary frame,
    /// positional binding with trailing variadic packing, `Return`
    /// consumed at the body.
    fn call_function(&mut self, name: Name, args: Vec<Value>) -> EvalResult {
        let def = *self
            .functions
            .get(&name)
            .ok_or_else(|| undefined_function(self.lookup_str(name)))?;
        let label = self.lookup_str(name);
        trace!(function = label, args = args.len(), "call");

        let variadic = def.params.last().is_some_and(|p| p.variadic);
        let fixed = if variadic {
            def.params.len() - 1
        } else {
            def.params.len()
        };
        if args.len() < fixed || (!variadic && args.len() > fixed) {
            return Err(arity_mismatch(label, def.params.len(), args.len()));
        }

        self.frames.push(label, FrameFlags::SCOPE_BOUNDARY);
        let mut args = args.into_iter();
        for param in &def.params[..fixed] {
            // Length was checked above.
            let value = args.next().unwrap_or(Value::Null);
            self.frames.define(param.name, value);
        }
        if variadic {
            if let Some(param) = def.params.last() {
                self.frames.define(param.name, Value::list(args.collect()));
            }
        }

        let result = self.exec_block(def.body);
        self.frames.pop();
        match result {
            Ok(Flow::Return(value)) => Ok(value),
            Ok(Flow::Normal) => Ok(Value::Null),
            Ok(Flow::Break) => Err(traced(stray_loop_signal("break"), label)),
            Ok(Flow::Continue) => Err(traced(stray_loop_signal("continue"), label)),
            Err(err) => Err(traced(err, label)),
        }
    }

    // Types, construction, embedded blocks

    fn resolve_type_ref(&mut self, ty: &'a TypeRef) -> Result<TypeHandle, EvalError> {
        self.host.resolve_type(self.lookup_str(ty.name), ty.arity)
    }

    fn eval_new(
        &mut self,
        ty: &'a TypeRef,
        args: &'a [Expr],
        init: &'a [InitEntry],
    ) -> EvalResult {
        let handle = self.resolve_type_ref(ty)?;
        let args = self.eval_args(args)?;
        let object = self.host.construct(handle, args)?;
        for entry in init {
            match entry {
                InitEntry::Property { name, value } => {
                    let value = self.eval_expr(value)?;
                    self.host
                        .set_property(&object, self.lookup_str(*name), value)?;
                }
                InitEntry::Element(element) => {
                    let element = self.eval_expr(element)?;
                    self.host.invoke_method(&object, "Add", vec![element])?;
                }
                InitEntry::Pair(key, value) => {
                    let key = self.eval_expr(key)?;
                    let value = self.eval_expr(value)?;
                    self.host.invoke_method(&object, "Add", vec![key, value])?;
                }
            }
        }
        Ok(object)
    }

    fn eval_iterator_block(&mut self, ty: Option<&'a TypeRef>, body: &'a [Stmt]) -> EvalResult {
        let element_ty = match ty {
            Some(t) => Some(self.resolve_type_ref(t)?),
            None => None,
        };
        // Collector but not a scope boundary: the body reads enclosing
        // locals, like `@block`. Only function entry closes a scope.
        self.frames.push("@iterator", FrameFlags::COLLECTOR);
        let flow = match self.exec_block(body) {
            Ok(flow) => flow,
            Err(err) => {
                self.frames.pop();
                return Err(traced(err, "@iterator"));
            }
        };
        let collected = self.frames.pop_collected();
        match flow {
            // Break and Return both just stop collection early.
            Flow::Normal | Flow::Break | Flow::Return(_) => {}
            Flow::Continue => return Err(traced(stray_loop_signal("continue"), "@iterator")),
        }
        let items = match element_ty {
            Some(ty) => collected
                .into_iter()
                .map(|v| self.host.convert(v, ty))
                .collect::<Result<Vec<_>, _>>()?,
            None => collected,
        };
        Ok(Value::list(items))
    }

    fn eval_block_expr(&mut self, body: &'a [Stmt]) -> EvalResult {
        // Not a scope boundary: the block sees enclosing locals.
        self.frames.push("@block", FrameFlags::empty());
        let result = self.exec_block(body);
        self.frames.pop();
        match result {
            Ok(Flow::Return(value)) => Ok(value),
            Ok(Flow::Normal) => Ok(Value::Null),
            Ok(Flow::Break) => Err(traced(stray_loop_signal("break"), "@block")),
            Ok(Flow::Continue) => Err(traced(stray_loop_signal("continue"), "@block")),
            Err(err) => Err(traced(err, "@block")),
        }
    }

    // Statements

    fn exec_block(&mut self, stmts: &'a [Stmt]) -> Result<Flow, EvalError> {
        for stmt in stmts {
            let flow = self.exec_stmt(stmt)?;
            if !flow.is_normal() {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &'a Stmt) -> Result<Flow, EvalError> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
            StmtKind::Empty => Ok(Flow::Normal),
            StmtKind::VarDecl { name, init } => {
                let value = match init {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                self.frames.define(*name, value);
                Ok(Flow::Normal)
            }
            StmtKind::FuncDecl(decl) => {
                self.declare_function(decl);
                Ok(Flow::Normal)
            }
            StmtKind::Block(stmts) => {
                self.frames.push("{}", FrameFlags::empty());
                let result = self.exec_block(stmts);
                self.frames.pop();
                result
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_condition(cond)? {
                    self.exec_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::While { cond, body } => self.exec_while(cond, body),
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => self.exec_for(init.as_deref(), cond.as_ref(), step.as_ref(), body),
            StmtKind::ForEach {
                binding,
                iterable,
                body,
            } => self.exec_foreach(*binding, iterable, body),
            StmtKind::Switch {
                subject,
                cases,
                default,
            } => self.exec_switch(subject, cases, default.as_deref()),
            StmtKind::Break => Ok(Flow::Break),
            StmtKind::Continue => Ok(Flow::Continue),
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Yield(expr) => {
                let value = self.eval_expr(expr)?;
                if self.frames.yield_value(value) {
                    Ok(Flow::Normal)
                } else {
                    Err(yield_outside_iterator())
                }
            }
        }
    }

    /// Register a declared function and make it referenceable by name.
    pub fn declare_function(&mut self, decl: &'a FuncDecl) {
        self.functions.insert(
            decl.name,
            FunctionDef {
                params: &decl.params,
                body: &decl.body,
            },
        );
    }

    fn exec_while(&mut self, cond: &'a Expr, body: &'a Stmt) -> Result<Flow, EvalError> {
        while self.eval_condition(cond)? {
            match self.exec_stmt(body)? {
                Flow::Normal | Flow::Continue => {}
                Flow::Break => break,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_for(
        &mut self,
        init: Option<&'a Stmt>,
        cond: Option<&'a Expr>,
        step: Option<&'a Expr>,
        body: &'a Stmt,
    ) -> Result<Flow, EvalError> {
        // The init clause's variable is scoped to the loop.
        self.frames.push("for", FrameFlags::empty());
        let result = (|| {
            if let Some(init) = init {
                self.exec_stmt(init)?;
            }
            loop {
                if let Some(cond) = cond {
                    if !self.eval_condition(cond)? {
                        break;
                    }
                }
                match self.exec_stmt(body)? {
                    // The step clause runs on Continue before the
                    // condition is re-tested.
                    Flow::Normal | Flow::Continue => {}
                    Flow::Break => break,
                    flow @ Flow::Return(_) => return Ok(flow),
                }
                if let Some(step) = step {
                    self.eval_expr(step)?;
                }
            }
            Ok(Flow::Normal)
        })();
        self.frames.pop();
        result
    }

    fn exec_foreach(
        &mut self,
        binding: Name,
        iterable: &'a Expr,
        body: &'a Stmt,
    ) -> Result<Flow, EvalError> {
        let source = self.eval_expr(iterable)?;
        let items = iterate(&source)?;
        self.frames.push("foreach", FrameFlags::empty());
        let result = (|| {
            for item in items {
                self.frames.define(binding, item);
                match self.exec_stmt(body)? {
                    Flow::Normal | Flow::Continue => {}
                    Flow::Break => break,
                    flow @ Flow::Return(_) => return Ok(flow),
                }
            }
            Ok(Flow::Normal)
        })();
        self.frames.pop();
        result
    }

    fn exec_switch(
        &mut self,
        subject: &'a Expr,
        cases: &'a [SwitchCase],
        default: Option<&'a [Stmt]>,
    ) -> Result<Flow, EvalError> {
        let subject = self.eval_expr(subject)?;
        let mut body = None;
        // First equal case wins; no fallthrough.
        for case in cases {
            let value = self.eval_expr(&case.value)?;
            if value == subject {
                body = Some(case.body.as_slice());
                break;
            }
        }
        let Some(body) = body.or(default) else {
            return Ok(Flow::Normal);
        };
        self.frames.push("switch", FrameFlags::empty());
        let result = self.exec_block(body);
        self.frames.pop();
        match result? {
            Flow::Normal | Flow::Break => Ok(Flow::Normal),
            flow => Ok(flow),
        }
    }
}

fn traced(mut err: EvalError, label: &str) -> EvalError {
    err.push_frame(label);
    err
}

/// Expand an iterable value into its element sequence.
///
/// Lists iterate their elements, maps iterate two-element
/// `[key, value]` lists, strings iterate one-character strings.
fn iterate(source: &Value) -> Result<Vec<Value>, EvalError> {
    match source {
        Value::List(items) => Ok(items.borrow().clone()),
        Value::Map(pairs) => Ok(pairs
            .borrow()
            .iter()
            .map(|(k, v)| Value::list(vec![k.clone(), v.clone()]))
            .collect()),
        Value::Str(text) => Ok(text.chars().map(|c| Value::str(c.to_string())).collect()),
        other => Err(not_iterable(other)),
    }
}
