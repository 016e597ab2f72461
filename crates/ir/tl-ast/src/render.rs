//! Kotlin-like text dump of a module fragment, used by snapshot tests

use crate::decl::{DeclKind, DeclOrigin, DelegatedCallKind, FunctionDecl};
use crate::expr::{Access, ConstKind, ConstValue, ExprKind, IntrinsicOp, Statement};
use crate::types::{AstType, TypeProjection};
use crate::{DeclId, ExprId, ModuleFragment, SymbolId};
use tl_intern::Interner;
use tl_syntax::{ClassKind, Variance};

/// Render every file, then the external stubs
pub fn render(fragment: &ModuleFragment, interner: &Interner) -> String {
    let mut printer = Printer::new(fragment, interner);
    for file in &fragment.files {
        printer.line(&format!("// file {}", file.name));
        if !file.package.is_empty() {
            let package: Vec<&str> = file.package.iter().map(|n| interner.resolve(*n)).collect();
            printer.line(&format!("package {}", package.join(".")));
        }
        for &annotation in &file.annotations {
            printer.start_line();
            printer.text("@file:");
            printer.expr(annotation);
            printer.newline();
        }
        for &decl in &file.declarations {
            printer.decl(decl);
        }
    }
    if !fragment.external_declarations.is_empty() {
        printer.line("// external");
        for &decl in &fragment.external_declarations {
            printer.decl(decl);
        }
    }
    printer.finish()
}

/// Render a single declaration
pub fn render_decl(fragment: &ModuleFragment, interner: &Interner, decl: DeclId) -> String {
    let mut printer = Printer::new(fragment, interner);
    printer.decl(decl);
    printer.finish()
}

/// Render a single expression without a trailing newline
pub fn render_expr(fragment: &ModuleFragment, interner: &Interner, expr: ExprId) -> String {
    let mut printer = Printer::new(fragment, interner);
    printer.expr(expr);
    printer.finish()
}

struct Printer<'a> {
    fragment: &'a ModuleFragment,
    interner: &'a Interner,
    out: String,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn new(fragment: &'a ModuleFragment, interner: &'a Interner) -> Self {
        Self {
            fragment,
            interner,
            out: String::new(),
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn start_line(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
    }

    fn line(&mut self, text: &str) {
        self.start_line();
        self.text(text);
        self.newline();
    }

    fn name(&self, symbol: SymbolId) -> &'a str {
        self.interner.resolve(self.fragment.symbols[symbol].name())
    }

    fn decl(&mut self, id: DeclId) {
        self.start_line();
        self.decl_inline(id);
        self.newline();
    }

    fn annotations(&mut self, annotations: &[ExprId]) {
        for &annotation in annotations {
            self.text("@");
            self.expr(annotation);
            self.text(" ");
        }
    }

    fn decl_inline(&mut self, id: DeclId) {
        let fragment = self.fragment;
        let store = &fragment.store;
        let decl = &store[id];
        if decl.origin == DeclOrigin::Stub {
            self.text("/* stub */ ");
        }
        self.annotations(&decl.annotations);
        let name = self.name(decl.symbol);

        match &decl.kind {
            DeclKind::Class(class) => {
                if class.is_data {
                    self.text("data ");
                }
                if class.is_companion {
                    self.text("companion ");
                }
                self.text(class.class_kind.keyword());
                if class.class_kind != ClassKind::EnumEntry || !name.is_empty() {
                    self.text(" ");
                    self.text(name);
                }
                self.type_parameters(&class.type_parameters);
                if !class.supertypes.is_empty() {
                    self.text(" : ");
                    self.types(&class.supertypes);
                }
                self.members(&class.declarations);
            }
            DeclKind::Function(function) => {
                self.text("fun ");
                self.type_parameters(&function.type_parameters);
                if !function.type_parameters.is_empty() {
                    self.text(" ");
                }
                if let Some(receiver) = &function.extension_receiver_type {
                    self.ty(receiver);
                    self.text(".");
                }
                self.text(name);
                self.value_parameters(&function.value_parameters);
                self.text(": ");
                self.ty(&function.return_type);
                if let Some(body) = function.body {
                    self.text(" ");
                    self.expr(body);
                }
            }
            DeclKind::Constructor(constructor) => {
                self.text("constructor");
                self.value_parameters(&constructor.value_parameters);
                if let Some(call) = constructor.delegated_call {
                    self.text(" : ");
                    self.expr(call);
                }
                if let Some(body) = constructor.body {
                    self.text(" ");
                    self.expr(body);
                }
            }
            DeclKind::Property(property) => {
                if property.is_const {
                    self.text("const ");
                }
                if property.is_lateinit {
                    self.text("lateinit ");
                }
                self.text(if property.is_var { "var " } else { "val " });
                if let Some(receiver) = &property.extension_receiver_type {
                    self.ty(receiver);
                    self.text(".");
                }
                self.text(name);
                self.text(": ");
                self.ty(&property.return_type);
                if let Some(initializer) = property.initializer {
                    self.text(" = ");
                    self.expr(initializer);
                }
                if let Some(delegate) = property.delegate {
                    self.text(" by ");
                    self.expr(delegate);
                }
                self.indent += 1;
                for accessor in [property.getter, property.setter].into_iter().flatten() {
                    self.newline();
                    self.decl(accessor);
                    // `decl` already ended the line
                    self.out.pop();
                }
                self.indent -= 1;
            }
            DeclKind::PropertyAccessor(accessor) => {
                self.text(if accessor.is_setter { "set" } else { "get" });
                self.value_parameters(&accessor.value_parameters);
                if let Some(body) = accessor.body {
                    self.text(" ");
                    self.expr(body);
                }
            }
            DeclKind::AnonymousInitializer(initializer) => {
                self.text("init ");
                self.expr(initializer.body);
            }
            DeclKind::TypeParameter(parameter) => {
                if parameter.is_reified {
                    self.text("reified ");
                }
                self.variance(parameter.variance);
                self.text(name);
                if !parameter.bounds.is_empty() {
                    self.text(" : ");
                    self.types(&parameter.bounds);
                }
            }
            DeclKind::ValueParameter(parameter) => {
                if parameter.is_vararg {
                    self.text("vararg ");
                }
                self.text(name);
                self.text(": ");
                self.ty(&parameter.ty);
                if let Some(default) = parameter.default_value {
                    self.text(" = ");
                    self.expr(default);
                }
            }
            DeclKind::TypeAlias(alias) => {
                self.text("typealias ");
                self.text(name);
                self.type_parameters(&alias.type_parameters);
                self.text(" = ");
                self.ty(&alias.expanded);
            }
        }
    }

    fn members(&mut self, members: &[DeclId]) {
        if members.is_empty() {
            return;
        }
        self.text(" {");
        self.newline();
        self.indent += 1;
        for &member in members {
            self.decl(member);
        }
        self.indent -= 1;
        self.start_line();
        self.text("}");
    }

    fn type_parameters(&mut self, parameters: &[DeclId]) {
        if parameters.is_empty() {
            return;
        }
        self.text("<");
        self.comma_separated(parameters, Self::decl_inline);
        self.text(">");
    }

    fn value_parameters(&mut self, parameters: &[DeclId]) {
        self.text("(");
        self.comma_separated(parameters, Self::decl_inline);
        self.text(")");
    }

    fn comma_separated<T: Copy>(&mut self, items: &[T], mut each: impl FnMut(&mut Self, T)) {
        for (index, &item) in items.iter().enumerate() {
            if index > 0 {
                self.text(", ");
            }
            each(self, item);
        }
    }

    fn variance(&mut self, variance: Variance) {
        if variance != Variance::Invariant {
            self.text(variance.keyword());
            self.text(" ");
        }
    }

    fn types(&mut self, types: &[AstType]) {
        for (index, ty) in types.iter().enumerate() {
            if index > 0 {
                self.text(", ");
            }
            self.ty(ty);
        }
    }

    fn ty(&mut self, ty: &AstType) {
        self.annotations(&ty.annotations);
        self.text(self.name(ty.classifier));
        if !ty.arguments.is_empty() {
            self.text("<");
            for (index, argument) in ty.arguments.iter().enumerate() {
                if index > 0 {
                    self.text(", ");
                }
                match argument {
                    TypeProjection::Star => self.text("*"),
                    TypeProjection::Projection { variance, ty } => {
                        self.variance(*variance);
                        self.ty(ty);
                    }
                }
            }
            self.text(">");
        }
        if ty.nullable {
            self.text("?");
        }
    }

    fn access(&mut self, access: &Access) {
        if let Some(receiver) = access.extension_receiver.or(access.dispatch_receiver) {
            self.expr(receiver);
            self.text(".");
        }
        self.text(self.name(access.callee));
        if !access.type_arguments.is_empty() {
            self.text("<");
            self.types(&access.type_arguments);
            self.text(">");
        }
    }

    fn arguments(&mut self, arguments: &[Option<ExprId>]) {
        self.text("(");
        for (index, argument) in arguments.iter().enumerate() {
            if index > 0 {
                self.text(", ");
            }
            match argument {
                Some(argument) => self.expr(*argument),
                None => self.text("<default>"),
            }
        }
        self.text(")");
    }

    fn expr_list(&mut self, exprs: &[ExprId]) {
        self.comma_separated(exprs, Self::expr);
    }

    fn label(&mut self, label: Option<tl_intern::Name>) {
        if let Some(label) = label {
            self.text("@");
            self.text(self.interner.resolve(label));
        }
    }

    fn block(&mut self, statements: &[Statement]) {
        if statements.is_empty() {
            self.text("{}");
            return;
        }
        self.text("{");
        self.newline();
        self.indent += 1;
        for statement in statements {
            match *statement {
                Statement::Declaration(decl) => self.decl(decl),
                Statement::Expression(expr) => {
                    self.start_line();
                    self.expr(expr);
                    self.newline();
                }
            }
        }
        self.indent -= 1;
        self.start_line();
        self.text("}");
    }

    fn lambda(&mut self, function: &FunctionDecl) {
        if let Some(label) = function.label {
            self.text(self.interner.resolve(label));
            self.text("@");
        }
        self.text("{ ");
        if !function.value_parameters.is_empty() {
            self.comma_separated(&function.value_parameters, Self::decl_inline);
            self.text(" -> ");
        }
        if let Some(body) = function.body {
            self.expr(body);
        }
        self.text(" }");
    }

    fn constant(&mut self, kind: ConstKind, value: &ConstValue) {
        let text = match (kind, value) {
            (_, ConstValue::Str(value)) => format!("{value:?}"),
            (ConstKind::Long, ConstValue::Integer(value)) => format!("{value}L"),
            (ConstKind::Short, ConstValue::Integer(value)) => format!("{value}.toShort()"),
            (ConstKind::Byte, ConstValue::Integer(value)) => format!("{value}.toByte()"),
            (_, ConstValue::Integer(value)) => value.to_string(),
            (ConstKind::Float, ConstValue::Float(value)) => format!("{value}F"),
            (_, ConstValue::Float(value)) => format!("{value:?}"),
            (_, ConstValue::Bool(value)) => value.to_string(),
            (_, ConstValue::Char(value)) => format!("{value:?}"),
            (_, ConstValue::Null) => "null".to_owned(),
        };
        self.text(&text);
    }

    #[allow(clippy::too_many_lines, reason = "One arm per expression variant")]
    fn expr(&mut self, id: ExprId) {
        let fragment = self.fragment;
        let store = &fragment.store;
        let expr = &store[id];
        self.annotations(&expr.annotations);

        match &expr.kind {
            ExprKind::Const { kind, value } => self.constant(*kind, value),
            ExprKind::Block { statements } => self.block(statements),
            ExprKind::QualifiedAccess(access) => self.access(access),
            ExprKind::Call { access, arguments } => {
                self.access(access);
                self.arguments(arguments);
            }
            ExprKind::DelegatedConstructorCall {
                kind, arguments, ..
            } => {
                self.text(match kind {
                    DelegatedCallKind::This => "this",
                    DelegatedCallKind::Super => "super",
                });
                self.arguments(arguments);
            }
            ExprKind::Assignment { access, value } => {
                self.access(access);
                self.text(" = ");
                self.expr(*value);
            }
            ExprKind::Intrinsic { op, arguments } => match (op, arguments.as_slice()) {
                (IntrinsicOp::Not, [operand]) => {
                    self.text("!");
                    self.expr(*operand);
                }
                (IntrinsicOp::CheckNotNull, [operand]) => {
                    self.expr(*operand);
                    self.text("!!");
                }
                _ => {
                    self.text("(");
                    for (index, argument) in arguments.iter().enumerate() {
                        if index > 0 {
                            self.text(" ");
                            self.text(op.symbol());
                            self.text(" ");
                        }
                        self.expr(*argument);
                    }
                    self.text(")");
                }
            },
            ExprKind::StringConcat { parts } => {
                self.text("strcat(");
                self.expr_list(parts);
                self.text(")");
            }
            ExprKind::Elvis { left, right } => {
                self.text("(");
                self.expr(*left);
                self.text(" ?: ");
                self.expr(*right);
                self.text(")");
            }
            ExprKind::TypeOperation {
                op,
                argument,
                operand,
            } => {
                self.text("(");
                self.expr(*argument);
                self.text(" ");
                self.text(op.keyword());
                self.text(" ");
                self.ty(operand);
                self.text(")");
            }
            ExprKind::When {
                subject,
                subject_variable,
                branches,
                ..
            } => {
                self.text("when ");
                if let Some(variable) = subject_variable {
                    self.text("(");
                    self.decl_inline(*variable);
                    self.text(") ");
                } else if let Some(subject) = subject {
                    self.text("(");
                    self.expr(*subject);
                    self.text(") ");
                }
                self.text("{");
                self.newline();
                self.indent += 1;
                for branch in branches {
                    self.start_line();
                    match branch.condition {
                        Some(condition) => self.expr(condition),
                        None => self.text("else"),
                    }
                    self.text(" -> ");
                    self.expr(branch.result);
                    self.newline();
                }
                self.indent -= 1;
                self.start_line();
                self.text("}");
            }
            ExprKind::WhenSubject { .. } => self.text("$subject"),
            ExprKind::While {
                target,
                condition,
                body,
            } => {
                self.loop_label(*target);
                self.text("while (");
                self.expr(*condition);
                self.text(") ");
                self.expr(*body);
            }
            ExprKind::DoWhile {
                target,
                condition,
                body,
            } => {
                self.loop_label(*target);
                self.text("do ");
                self.expr(*body);
                self.text(" while (");
                self.expr(*condition);
                self.text(")");
            }
            ExprKind::Break { target } => {
                self.text("break");
                self.label(store.loop_target(*target).label);
            }
            ExprKind::Continue { target } => {
                self.text("continue");
                self.label(store.loop_target(*target).label);
            }
            ExprKind::Return { target, value } => {
                self.text("return");
                self.label(store.function_target(*target).label);
                self.text(" ");
                self.expr(*value);
            }
            ExprKind::Throw { exception } => {
                self.text("throw ");
                self.expr(*exception);
            }
            ExprKind::Try {
                body,
                catches,
                finally,
            } => {
                self.text("try ");
                self.expr(*body);
                for catch in catches {
                    self.text(" catch (");
                    self.decl_inline(catch.parameter);
                    self.text(") ");
                    self.expr(catch.body);
                }
                if let Some(finally) = finally {
                    self.text(" finally ");
                    self.expr(*finally);
                }
            }
            ExprKind::This { label } => {
                self.text("this");
                self.label(*label);
            }
            ExprKind::Super { super_type } => {
                self.text("super");
                if let Some(super_type) = super_type {
                    self.text("<");
                    self.ty(super_type);
                    self.text(">");
                }
            }
            ExprKind::ClassReference { classifier } => {
                self.text(self.name(*classifier));
                self.text("::class");
            }
            ExprKind::CallableReference(access) => {
                if let Some(receiver) = access.extension_receiver.or(access.dispatch_receiver) {
                    self.expr(receiver);
                }
                self.text("::");
                self.text(self.name(access.callee));
            }
            ExprKind::Lambda { function } => match &store[*function].kind {
                DeclKind::Function(decl) => self.lambda(decl),
                _ => self.decl_inline(*function),
            },
            ExprKind::AnonymousObject { class } => self.decl_inline(*class),
            ExprKind::SafeCall {
                receiver, selector, ..
            } => {
                self.expr(*receiver);
                self.text("?.{ ");
                self.expr(*selector);
                self.text(" }");
            }
            ExprKind::CheckedSafeCallSubject { .. } => self.text("$safe"),
            ExprKind::Vararg { elements } => {
                self.text("vararg(");
                self.expr_list(elements);
                self.text(")");
            }
            ExprKind::Spread { expression } => {
                self.text("*");
                self.expr(*expression);
            }
            ExprKind::DelegateFieldAccess { property, receiver } => {
                if let Some(receiver) = receiver {
                    self.expr(*receiver);
                    self.text(".");
                }
                self.text(self.name(*property));
                self.text("$delegate");
            }
            ExprKind::Unit => self.text("Unit"),
            ExprKind::Error { message, .. } => {
                self.text("error(");
                self.text(&format!("{message:?}"));
                self.text(")");
            }
        }
    }

    fn loop_label(&mut self, target: crate::LoopTargetId) {
        if let Some(label) = self.fragment.store.loop_target(target).label {
            self.text(self.interner.resolve(label));
            self.text("@ ");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Declaration, PropertyDecl};
    use crate::expr::Expr;
    use crate::store::AstStore;
    use crate::symbol::{Symbol, SymbolIdentity, SymbolKind};
    use crate::AstFile;
    use expect_test::expect;
    use la_arena::Arena;

    #[test]
    fn test_render_local_property_and_string_concat() {
        let interner = Interner::new();
        let mut symbols = Arena::new();
        let string = symbols.alloc(Symbol::new(
            SymbolKind::Class,
            SymbolIdentity::local(interner.intern("String")),
        ));
        let name = symbols.alloc(Symbol::new(
            SymbolKind::Property,
            SymbolIdentity::local(interner.intern("greeting")),
        ));

        let mut store = AstStore::new();
        let ty = AstType::simple(string);
        let hello = store.alloc_expr(Expr::new(
            ty.clone(),
            ExprKind::Const {
                kind: ConstKind::String,
                value: ConstValue::Str("hello ".to_owned()),
            },
        ));
        let world = store.alloc_expr(Expr::new(
            ty.clone(),
            ExprKind::Const {
                kind: ConstKind::String,
                value: ConstValue::Str("world".to_owned()),
            },
        ));
        let concat = store.alloc_expr(Expr::new(
            ty.clone(),
            ExprKind::StringConcat {
                parts: vec![hello, world],
            },
        ));
        let decl = store.alloc_decl(Declaration {
            symbol: name,
            origin: DeclOrigin::Source,
            annotations: Vec::new(),
            kind: DeclKind::Property(PropertyDecl::local(ty, Some(concat))),
        });

        let fragment = ModuleFragment {
            name: "main".to_owned(),
            files: vec![AstFile {
                name: "greeting.kt".to_owned(),
                package: vec![interner.intern("demo")],
                annotations: Vec::new(),
                declarations: vec![decl],
            }],
            external_declarations: Vec::new(),
            symbols,
            store,
        };

        expect![[r#"
            // file greeting.kt
            package demo
            val greeting: String = strcat("hello ", "world")
        "#]]
        .assert_eq(&render(&fragment, &interner));
    }
}
