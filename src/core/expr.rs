// Basic arithmetic calculator
// Supports: + - * / with BODMAS precedence, parentheses, unary signs,
// `n%` as a percentage, `%` between operands as modulo, and the ANS keyword.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Invalid input")]
    InvalidInput,
    #[error("Syntax error: {0}")]
    Syntax(String),
    #[error("Math error")]
    Math,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    Binary {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    /// `%` directly after a number literal with no operand following it.
    Percent,
    /// `%` used as a binary operator.
    Modulo,
    LParen,
    RParen,
}

/// Longest expression accepted, counted after `ANS` substitution.
pub const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest run of parentheses and unary signs the parser will follow.
pub const MAX_NESTING: usize = 64;

/// Calculator state: the last successful answer and a history line.
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    last_ans: f64,
    history: String,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `ANS` bound to a previous answer.
    pub fn with_answer(last_ans: f64) -> Self {
        Self {
            last_ans,
            history: String::new(),
        }
    }

    pub fn last_answer(&self) -> f64 {
        self.last_ans
    }

    pub fn history(&self) -> &str {
        &self.history
    }

    /// Evaluates `input`, returning `Ok(None)` for blank input.
    pub fn evaluate(&mut self, input: &str) -> Result<Option<f64>, CalcError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let expr = substitute_ans(trimmed, self.last_ans);
        match evaluate_expression(&expr) {
            Ok(value) => {
                self.history = format!("{expr} =");
                self.last_ans = value;
                Ok(Some(value))
            }
            Err(err) => {
                self.history = match err {
                    CalcError::InvalidInput => "Invalid input".to_string(),
                    _ => "Error".to_string(),
                };
                Err(err)
            }
        }
    }
}

/// Evaluates an expression with no `ANS` references.
pub fn evaluate_expression(input: &str) -> Result<f64, CalcError> {
    let normalized: String = input
        .chars()
        .map(|c| match c {
            '×' => '*',
            '÷' => '/',
            other => other,
        })
        .collect();

    let allowed = |c: char| c.is_ascii_digit() || c.is_whitespace() || "+-*/%().".contains(c);
    if normalized.trim().is_empty() || !normalized.chars().all(allowed) {
        return Err(CalcError::InvalidInput);
    }

    if normalized.chars().count() > MAX_EXPRESSION_LEN {
        return Err(CalcError::Syntax("Expression too long".to_string()));
    }

    let tokens = tokenize(&normalized)?;
    let (expr, pos) = parse_add_sub(&tokens, 0, 0)?;
    if pos != tokens.len() {
        return Err(CalcError::Syntax("Unexpected token".to_string()));
    }

    let value = eval(&expr);
    if !value.is_finite() {
        return Err(CalcError::Math);
    }
    Ok(round_to_ten_places(value))
}

fn nested(depth: usize) -> Result<usize, CalcError> {
    if depth >= MAX_NESTING {
        return Err(CalcError::Syntax("Expression too deeply nested".to_string()));
    }
    Ok(depth + 1)
}

fn round_to_ten_places(value: f64) -> f64 {
    format!("{value:.10}").parse().unwrap_or(value)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn substitute_ans(input: &str, last_ans: f64) -> String {
    let replacement = if last_ans < 0.0 {
        format!("({last_ans})")
    } else {
        format!("{last_ans}")
    };

    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        let is_ans = i + 3 <= chars.len()
            && chars[i..i + 3]
                .iter()
                .zip("ans".chars())
                .all(|(c, expected)| c.to_ascii_lowercase() == expected)
            && (i == 0 || !is_word_char(chars[i - 1]))
            && chars.get(i + 3).is_none_or(|c| !is_word_char(*c));
        if is_ans {
            out.push_str(&replacement);
            i += 3;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => { tokens.push(Token::Plus); chars.next(); }
            '-' => { tokens.push(Token::Minus); chars.next(); }
            '*' => { tokens.push(Token::Star); chars.next(); }
            '/' => { tokens.push(Token::Slash); chars.next(); }
            '(' => { tokens.push(Token::LParen); chars.next(); }
            ')' => { tokens.push(Token::RParen); chars.next(); }
            '%' => {
                chars.next();
                let after_number = matches!(tokens.last(), Some(Token::Number(_)));
                let operand_follows = chars
                    .clone()
                    .find(|c| !c.is_whitespace())
                    .is_some_and(|c| c.is_ascii_digit() || c == '(');
                if after_number && !operand_follows {
                    tokens.push(Token::Percent);
                } else {
                    tokens.push(Token::Modulo);
                }
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = literal
                    .parse::<f64>()
                    .map_err(|_| CalcError::Syntax(format!("Invalid number: {literal}")))?;
                tokens.push(Token::Number(n));
            }
            other => return Err(CalcError::Syntax(format!("Unexpected character: {other}"))),
        }
    }

    Ok(tokens)
}

fn parse_add_sub(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), CalcError> {
    let (mut left, mut pos) = parse_mul_div(tokens, pos, depth)?;

    while pos < tokens.len() {
        let op = match &tokens[pos] {
            Token::Plus => Op::Add,
            Token::Minus => Op::Sub,
            _ => break,
        };
        let (right, new_pos) = parse_mul_div(tokens, pos + 1, depth)?;
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        pos = new_pos;
    }

    Ok((left, pos))
}

fn parse_mul_div(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), CalcError> {
    let (mut left, mut pos) = parse_unary(tokens, pos, depth)?;

    while pos < tokens.len() {
        let op = match &tokens[pos] {
            Token::Star => Op::Mul,
            Token::Slash => Op::Div,
            Token::Modulo => Op::Rem,
            _ => break,
        };
        let (right, new_pos) = parse_unary(tokens, pos + 1, depth)?;
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        pos = new_pos;
    }

    Ok((left, pos))
}

fn parse_unary(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), CalcError> {
    match tokens.get(pos) {
        Some(Token::Minus) => {
            let (operand, new_pos) = parse_unary(tokens, pos + 1, nested(depth)?)?;
            Ok((Expr::Neg(Box::new(operand)), new_pos))
        }
        Some(Token::Plus) => parse_unary(tokens, pos + 1, nested(depth)?),
        _ => parse_percent(tokens, pos, depth),
    }
}

// Postfix percent binds tightest and desugars to division by 100
fn parse_percent(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), CalcError> {
    let (mut expr, mut pos) = parse_primary(tokens, pos, depth)?;

    while let Some(Token::Percent) = tokens.get(pos) {
        expr = Expr::Binary {
            op: Op::Div,
            left: Box::new(expr),
            right: Box::new(Expr::Number(100.0)),
        };
        pos += 1;
    }

    Ok((expr, pos))
}

fn parse_primary(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), CalcError> {
    match tokens.get(pos) {
        Some(Token::Number(n)) => Ok((Expr::Number(*n), pos + 1)),
        Some(Token::LParen) => {
            let (inner, pos) = parse_add_sub(tokens, pos + 1, nested(depth)?)?;
            match tokens.get(pos) {
                Some(Token::RParen) => Ok((inner, pos + 1)),
                _ => Err(CalcError::Syntax("Missing closing parenthesis".to_string())),
            }
        }
        Some(_) => Err(CalcError::Syntax("Unexpected operator".to_string())),
        None => Err(CalcError::Syntax("Unexpected end of expression".to_string())),
    }
}

fn eval(expr: &Expr) -> f64 {
    match expr {
        Expr::Number(n) => *n,
        Expr::Neg(inner) => -eval(inner),
        Expr::Binary { op, left, right } => {
            let l = eval(left);
            let r = eval(right);
            match op {
                Op::Add => l + r,
                Op::Sub => l - r,
                Op::Mul => l * r,
                Op::Div => l / r,
                Op::Rem => l % r,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(input: &str) -> Result<f64, CalcError> {
        evaluate_expression(input)
    }

    #[test]
    fn follows_operator_precedence() {
        assert_eq!(calc("2+3*4"), Ok(14.0));
        assert_eq!(calc("(2+3)*4"), Ok(20.0));
        assert_eq!(calc("10-4-3"), Ok(3.0));
        assert_eq!(calc("100/10/5"), Ok(2.0));
        assert_eq!(calc("-3+5"), Ok(2.0));
        assert_eq!(calc("2*-3"), Ok(-6.0));
    }

    #[test]
    fn pretty_operators_are_normalized() {
        assert_eq!(calc("6×7"), Ok(42.0));
        assert_eq!(calc("9÷4"), Ok(2.25));
    }

    #[test]
    fn percent_versus_modulo() {
        assert_eq!(calc("50%"), Ok(0.5));
        assert_eq!(calc("200*15%"), Ok(30.0));
        assert_eq!(calc("10%3"), Ok(1.0));
        assert_eq!(calc("10 % (4)"), Ok(2.0));
        assert_eq!(calc("-7%3"), Ok(-1.0));
    }

    #[test]
    fn results_are_rounded_to_ten_places() {
        assert_eq!(calc("0.1+0.2"), Ok(0.3));
        assert_eq!(calc("1/3"), Ok(0.3333333333));
    }

    #[test]
    fn rejects_foreign_characters() {
        assert_eq!(calc("2^3"), Err(CalcError::InvalidInput));
        assert_eq!(calc("alert(1)"), Err(CalcError::InvalidInput));
    }

    #[test]
    fn reports_syntax_errors() {
        assert!(matches!(calc("2+"), Err(CalcError::Syntax(_))));
        assert!(matches!(calc("(2+3"), Err(CalcError::Syntax(_))));
        assert!(matches!(calc("1.2.3"), Err(CalcError::Syntax(_))));
        assert!(matches!(calc("2 3"), Err(CalcError::Syntax(_))));
        assert!(matches!(calc("5%%"), Err(CalcError::Syntax(_))));
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(calc(&nested(MAX_NESTING)), Ok(1.0));
        assert_eq!(
            calc(&nested(MAX_NESTING + 1)),
            Err(CalcError::Syntax("Expression too deeply nested".to_string()))
        );
        let signs = format!("{}1", "-".repeat(MAX_NESTING + 1));
        assert_eq!(
            calc(&signs),
            Err(CalcError::Syntax("Expression too deeply nested".to_string()))
        );
    }

    #[test]
    fn oversized_input_is_rejected_before_parsing() {
        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(calc(&parens), Err(CalcError::Syntax("Expression too long".to_string())));
        let signs = format!("{}1", "-".repeat(100_000));
        assert_eq!(calc(&signs), Err(CalcError::Syntax("Expression too long".to_string())));

        let sum = vec!["1"; MAX_EXPRESSION_LEN / 2].join("+");
        assert_eq!(calc(&sum), Ok((MAX_EXPRESSION_LEN / 2) as f64));
    }

    #[test]
    fn non_finite_results_are_math_errors() {
        assert_eq!(calc("1/0"), Err(CalcError::Math));
        assert_eq!(calc("0/0"), Err(CalcError::Math));
    }

    #[test]
    fn calculator_reuses_last_answer() {
        let mut calc = Calculator::new();
        assert_eq!(calc.evaluate("12*3"), Ok(Some(36.0)));
        assert_eq!(calc.history(), "12*3 =");
        assert_eq!(calc.evaluate("ANS/4"), Ok(Some(9.0)));
        assert_eq!(calc.history(), "36/4 =");
        assert_eq!(calc.evaluate("ans - 10"), Ok(Some(-1.0)));
        assert_eq!(calc.evaluate("2-ANS"), Ok(Some(3.0)));
        assert_eq!(calc.history(), "2-(-1) =");
    }

    #[test]
    fn calculator_keeps_answer_on_error() {
        let mut calc = Calculator::new();
        calc.evaluate("5").expect("valid");
        assert_eq!(calc.evaluate("5/0"), Err(CalcError::Math));
        assert_eq!(calc.history(), "Error");
        assert_eq!(calc.evaluate("x"), Err(CalcError::InvalidInput));
        assert_eq!(calc.history(), "Invalid input");
        assert_eq!(calc.last_answer(), 5.0);
        assert_eq!(calc.evaluate("   "), Ok(None));
    }

    #[test]
    fn ans_must_be_a_whole_word() {
        let mut calc = Calculator::new();
        calc.evaluate("7").expect("valid");
        assert_eq!(calc.evaluate("ANSWER"), Err(CalcError::InvalidInput));
    }

    #[test]
    fn seeded_answer_is_available_immediately() {
        let mut calc = Calculator::with_answer(-2.5);
        assert_eq!(calc.evaluate("ans*2"), Ok(Some(-5.0)));
        assert_eq!(calc.history(), "(-2.5)*2 =");
    }
}
