/// Forms the evaluator handles itself instead of applying a function
///
/// Any list head that is not one of these symbols is an ordinary
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    /// `(def name value)`
    Def,
    /// `(let* [name value ...] body...)`
    LetStar,
    /// `(if test then else?)`
    If,
    /// `(do form...)`
    Do,
    /// `(fn name? [params] body...)`, also spelled `fn*`
    Fn,
    /// `(defmacro name [params] body...)`
    Defmacro,
    /// `(quote form)`
    Quote,
    /// `(quasiquote template)`
    Quasiquote,
    /// `(quasiquoteexpand template)`
    QuasiquoteExpand,
    /// `(macroexpand form)`
    Macroexpand,
    /// `(try body (catch name handler...) (finally cleanup...))`
    Try,
    /// `(loop [name init ...] body...)`
    Loop,
    /// `(recur value...)`
    Recur,
    /// `(deftest name body...)`
    Deftest,
    /// `(testing label body...)`
    Testing,
    /// `(ns ...)`
    Ns,
    /// `(discard form)`, produced by `#_`
    Discard,
}

impl SpecialForm {
    /// Looks up the special form named by a list head symbol
    pub fn from_symbol(name: &str) -> Option<Self> {
        let form = match name {
            "def" => SpecialForm::Def,
            "let*" => SpecialForm::LetStar,
            "if" => SpecialForm::If,
            "do" => SpecialForm::Do,
            "fn" | "fn*" => SpecialForm::Fn,
            "defmacro" => SpecialForm::Defmacro,
            "quote" => SpecialForm::Quote,
            "quasiquote" => SpecialForm::Quasiquote,
            "quasiquoteexpand" => SpecialForm::QuasiquoteExpand,
            "macroexpand" => SpecialForm::Macroexpand,
            "try" => SpecialForm::Try,
            "loop" => SpecialForm::Loop,
            "recur" => SpecialForm::Recur,
            "deftest" => SpecialForm::Deftest,
            "testing" => SpecialForm::Testing,
            "ns" => SpecialForm::Ns,
            "discard" => SpecialForm::Discard,
            _ => return None,
        };
        Some(form)
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            SpecialForm::Def => "def",
            SpecialForm::LetStar => "let*",
            SpecialForm::If => "if",
            SpecialForm::Do => "do",
            SpecialForm::Fn => "fn",
            SpecialForm::Defmacro => "defmacro",
            SpecialForm::Quote => "quote",
            SpecialForm::Quasiquote => "quasiquote",
            SpecialForm::QuasiquoteExpand => "quasiquoteexpand",
            SpecialForm::Macroexpand => "macroexpand",
            SpecialForm::Try => "try",
            SpecialForm::Loop => "loop",
            SpecialForm::Recur => "recur",
            SpecialForm::Deftest => "deftest",
            SpecialForm::Testing => "testing",
            SpecialForm::Ns => "ns",
            SpecialForm::Discard => "discard",
        }
    }
}
