use crate::expr::{Creator, Expr, Member};

/// Renders an expression tree in fully parenthesised prefix form, e.g.
/// `1+2*3` becomes `(+ 1 (* 2 3))`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Assign { op, target, value } => {
                format!("({} {} {})", op.as_str(), self.print(target), self.print(value))
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => format!(
                "(?: {} {} {})",
                self.print(condition),
                self.print(then_branch),
                self.print(else_branch)
            ),

            Expr::Binary { op, left, right } => {
                format!("({} {} {})", op.as_str(), self.print(left), self.print(right))
            }

            Expr::Unary { op, operand } => format!("({} {})", op.as_str(), self.print(operand)),

            Expr::IncDec { op, operand } => {
                format!("({} {})", op.name(), self.print(operand))
            }

            Expr::InstanceOf { operand, ty } => {
                format!("(instanceof {} {})", self.print(operand), ty)
            }

            Expr::Cast { ty, operand } => format!("(cast {} {})", ty, self.print(operand)),

            Expr::Literal(literal) => literal.text.clone(),

            Expr::Ident(name) => name.clone(),

            Expr::Parenthesized(inner) => format!("(group {})", self.print(inner)),

            Expr::Dot { target, member } => {
                let member: String = match member {
                    Member::Ident(name) => name.clone(),
                    Member::This => "this".to_string(),
                    Member::Super => "super".to_string(),
                    Member::Class => "class".to_string(),
                    Member::New { class, arguments } => {
                        format!("(new {}{})", class, self.list(arguments))
                    }
                };

                format!("(. {} {})", self.print(target), member)
            }

            Expr::MethodCall { callee, arguments } => {
                format!("(call {}{})", self.print(callee), self.list(arguments))
            }

            Expr::ArrayAccess { array, index } => {
                format!("([] {} {})", self.print(array), self.print(index))
            }

            Expr::This => "this".to_string(),

            Expr::Super => "super".to_string(),

            Expr::New(Creator::Object { ty, arguments }) => {
                format!("(new {}{})", ty, self.list(arguments))
            }

            Expr::New(Creator::Array {
                ty,
                dimensions,
                initializer,
            }) => {
                let mut out: String = format!("(new-array {}{}", ty, self.list(dimensions));

                if let Some(elements) = initializer {
                    out.push_str(&format!(" {{{}}}", self.list(elements).trim_start()));
                }

                out.push(')');
                out
            }

            Expr::ArrayInitializer(elements) => format!("{{{}}}", self.list(elements).trim_start()),

            Expr::ClassLiteral(ty) => format!("(class {})", ty),
        }
    }

    /// Space‑prefixed rendering of each element.
    fn list(&self, exprs: &[Expr]) -> String {
        exprs
            .iter()
            .map(|e| format!(" {}", self.print(e)))
            .collect()
    }
}
