use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::parser::{read_all, read_str};
use crate::runtime::environment::{Env, Environment, LoopPoint};
use crate::runtime::printer::pr_str;
use crate::runtime::quasiquote::quasiquote;
use crate::runtime::session::{TestRecord, TestSession};
use crate::runtime::special_forms::SpecialForm;
use crate::runtime::value::{Closure, Function, Params, Value};
use crate::runtime::{with_stack, EvaluatorConfig};
use crate::tools::stdlib::collections;
use crate::tools::{check_arity, Callback, ToolRegistry};

/// Bootstrap library, evaluated in the root environment at startup
const CORE_LIBRARY: &str = include_str!("core.clj");

/// LISP evaluator
///
/// Owns the root environment, so definitions persist from one
/// [`evaluate`](LispEvaluator::evaluate) call to the next.
pub struct LispEvaluator {
    /// Root environment
    env: Env,
    /// Primitive library installed in the root environment
    registry: Arc<ToolRegistry>,
    /// Evaluation settings
    config: EvaluatorConfig,
    /// `deftest` results
    session: TestSession,
    /// Gensym counter for generating unique symbols
    gensym_counter: u64,
    /// Source of `loop` activation ids
    loop_counter: u64,
    /// Current nesting of non-tail `eval` calls
    depth: usize,
}

/// Outcome of one evaluation step of the trampoline
enum Step {
    /// Evaluation finished with this value
    Return(Value),
    /// Evaluation continues with this form in this environment (tail position)
    Continue(Value, Env),
}

/// Wraps several body forms in `do`
fn body_form(forms: &[Value]) -> Value {
    match forms {
        [] => Value::Nil,
        [single] => single.clone(),
        _ => {
            let mut items = Vec::with_capacity(forms.len() + 1);
            items.push(Value::symbol("do"));
            items.extend(forms.iter().cloned());
            Value::list(items)
        }
    }
}

fn special_arity(form: SpecialForm, expected: &str, items: &[Value]) -> Error {
    Error::arity(form.name(), expected, items.len() - 1)
}

impl LispEvaluator {
    /// Creates an evaluator with the standard library and the bootstrap library loaded
    pub fn new() -> Result<Self> {
        Self::with_config(EvaluatorConfig::default())
    }

    /// Creates an evaluator with custom settings
    pub fn with_config(config: EvaluatorConfig) -> Result<Self> {
        Self::with_registry(ToolRegistry::new(), config)
    }

    /// Creates an evaluator over a custom primitive library
    ///
    /// Fails with [`Error::BootstrapFailed`] if the bootstrap library does
    /// not load; no partially initialized evaluator is ever returned.
    pub fn with_registry(registry: ToolRegistry, config: EvaluatorConfig) -> Result<Self> {
        let env = Environment::new();
        registry.install(&env);

        let mut evaluator = LispEvaluator {
            env,
            registry: Arc::new(registry),
            config,
            session: TestSession::new(),
            gensym_counter: 0,
            loop_counter: 0,
            depth: 0,
        };
        if evaluator.config.load_bootstrap {
            evaluator.load_bootstrap()?;
        }
        Ok(evaluator)
    }

    fn load_bootstrap(&mut self) -> Result<()> {
        tracing::debug!("loading bootstrap library");
        let source = format!("(do {}\n)", CORE_LIBRARY);
        let form = read_str(&source).map_err(|e| Error::BootstrapFailed(e.to_string()))?;
        let root = Rc::clone(&self.env);
        self.eval(form, &root)
            .map_err(|e| Error::BootstrapFailed(e.to_string()))?;
        tracing::debug!(bindings = self.env.len(), "bootstrap library loaded");
        Ok(())
    }

    /// Root environment
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Active configuration
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Primitive library
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Reads one form, evaluates it in the root environment and prints the
    /// result readably
    pub fn evaluate(&mut self, source: &str) -> Result<String> {
        let form = read_str(source)?;
        let root = Rc::clone(&self.env);
        let value = self.eval(form, &root)?;
        Ok(pr_str(&value, true))
    }

    /// Reads and evaluates every form in `source`, returning the last value
    /// (`nil` when there are none)
    pub fn evaluate_all(&mut self, source: &str) -> Result<Value> {
        let root = Rc::clone(&self.env);
        let mut last = Value::Nil;
        for form in read_all(source)? {
            last = self.eval(form, &root)?;
        }
        Ok(last)
    }

    /// `deftest` results recorded so far, oldest first
    pub fn tests(&self) -> &[TestRecord] {
        self.session.records()
    }

    /// The test session holding `deftest` results
    pub fn session(&self) -> &TestSession {
        &self.session
    }

    /// Discards all `deftest` results
    pub fn clear_tests(&mut self) {
        self.session.clear();
    }

    /// Evaluates a form in `env`
    ///
    /// Tail positions are evaluated by looping, not recursing, so only
    /// non-tail nesting counts towards the configured `max_depth`.
    pub fn eval(&mut self, form: Value, env: &Env) -> Result<Value> {
        if self.depth >= self.config.max_depth {
            return Err(Error::RecursionLimit {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        let result = with_stack(|| self.eval_trampoline(form, Rc::clone(env)));
        self.depth -= 1;
        result
    }

    fn eval_trampoline(&mut self, mut form: Value, mut env: Env) -> Result<Value> {
        loop {
            if !form.is_list() {
                return self.eval_ast(&form, &env);
            }

            form = self.macroexpand(form, &env)?;
            let items = match &form {
                Value::List(items) => Rc::clone(items),
                _ => return self.eval_ast(&form, &env),
            };
            if items.is_empty() {
                return Ok(form);
            }

            let step = match &items[0] {
                Value::Keyword(_) | Value::Map(_) | Value::Vector(_) => {
                    Step::Continue(Self::accessor_call(&items)?, env)
                }
                Value::Symbol(name) => match SpecialForm::from_symbol(name) {
                    Some(special) => self.eval_special(special, &items, &env)?,
                    None => self.eval_application(&items, &env)?,
                },
                _ => self.eval_application(&items, &env)?,
            };

            match step {
                Step::Return(value) => return Ok(value),
                Step::Continue(next_form, next_env) => {
                    form = next_form;
                    env = next_env;
                }
            }
        }
    }

    /// Evaluates a non-list form: symbols are looked up, collections are
    /// evaluated element-wise and everything else evaluates to itself
    fn eval_ast(&mut self, form: &Value, env: &Env) -> Result<Value> {
        match form {
            Value::Symbol(name) => env.get(name),
            Value::List(items) => Ok(Value::list(self.eval_each(items, env)?)),
            Value::Vector(items) => Ok(Value::vector(self.eval_each(items, env)?)),
            Value::Map(entries) => {
                let mut evaluated = BTreeMap::new();
                for (k, v) in entries.iter() {
                    let key = self.eval(k.clone(), env)?;
                    let value = self.eval(v.clone(), env)?;
                    evaluated.insert(key, value);
                }
                Ok(Value::map(evaluated))
            }
            _ => Ok(form.clone()),
        }
    }

    fn eval_each(&mut self, forms: &[Value], env: &Env) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(forms.len());
        for form in forms {
            values.push(self.eval(form.clone(), env)?);
        }
        Ok(values)
    }

    /// `(:k m default?)` becomes `(get m :k default?)`; `(m k)` and `(v i)`
    /// become `(get m k)` and `(get v i)`
    fn accessor_call(items: &[Value]) -> Result<Value> {
        let head = &items[0];
        let args = &items[1..];
        if args.is_empty() || args.len() > 2 {
            return Err(Error::arity(pr_str(head, true), "1 to 2", args.len()));
        }

        let mut call = vec![Value::symbol("get")];
        match head {
            Value::Keyword(_) => {
                call.push(args[0].clone());
                call.push(head.clone());
            }
            _ => {
                call.push(head.clone());
                call.push(args[0].clone());
            }
        }
        call.extend(args.get(1).cloned());
        Ok(Value::list(call))
    }

    fn eval_application(&mut self, items: &[Value], env: &Env) -> Result<Step> {
        let f = self.eval(items[0].clone(), env)?;
        let args = self.eval_each(&items[1..], env)?;

        match &f {
            Value::Function(Function::Closure(closure)) => {
                let frame = closure.bind(&args)?;
                Ok(Step::Continue(closure.body.clone(), frame))
            }
            _ => Ok(Step::Return(self.apply(&f, &args)?)),
        }
    }

    /// Applies a callable value to evaluated arguments
    ///
    /// Besides functions, keywords, maps and vectors are callable and behave
    /// like `get`.
    pub fn apply(&mut self, f: &Value, args: &[Value]) -> Result<Value> {
        match f {
            Value::Function(Function::Closure(closure)) => {
                let frame = closure.bind(args)?;
                self.eval(closure.body.clone(), &frame)
            }
            Value::Function(Function::Primitive(tool)) => {
                if let Some(arity) = tool.arity() {
                    if args.len() != arity {
                        return Err(Error::arity(tool.name(), arity.to_string(), args.len()));
                    }
                }
                tool.execute(args, self)
            }
            Value::Keyword(_) => {
                check_arity(&pr_str(f, true), args, 1, Some(2))?;
                Ok(collections::get(&args[0], f, args.get(1)))
            }
            Value::Map(_) | Value::Vector(_) => {
                check_arity(f.type_name(), args, 1, Some(2))?;
                Ok(collections::get(f, &args[0], args.get(1)))
            }
            other => Err(Error::NotCallable {
                type_name: other.type_name().to_string(),
            }),
        }
    }

    /// Expands macro calls at the head of `form` until none is left
    ///
    /// Forms whose head is not a macro come back unchanged.
    pub fn macroexpand(&mut self, mut form: Value, env: &Env) -> Result<Value> {
        while let Some((closure, args)) = Self::macro_call(&form, env) {
            tracing::trace!(name = %closure.display_name(), "expanding macro");
            let frame = closure.bind(&args)?;
            form = self.eval(closure.body.clone(), &frame)?;
        }
        Ok(form)
    }

    fn macro_call(form: &Value, env: &Env) -> Option<(Rc<Closure>, Vec<Value>)> {
        let items = match form {
            Value::List(items) => items,
            _ => return None,
        };
        let name = match items.first() {
            Some(Value::Symbol(name)) => name,
            _ => return None,
        };
        match &env.find(name)? {
            Value::Function(Function::Closure(closure)) if closure.is_macro => {
                Some((Rc::clone(closure), items[1..].to_vec()))
            }
            _ => None,
        }
    }

    fn eval_special(&mut self, form: SpecialForm, items: &[Value], env: &Env) -> Result<Step> {
        match form {
            SpecialForm::Def => self.eval_def(items, env),
            SpecialForm::LetStar => self.eval_let(items, env),
            SpecialForm::If => self.eval_if(items, env),
            SpecialForm::Do => self.eval_do(items, env),
            SpecialForm::Fn => Self::eval_fn(items, env),
            SpecialForm::Defmacro => Self::eval_defmacro(items, env),
            SpecialForm::Quote => {
                if items.len() != 2 {
                    return Err(special_arity(form, "1", items));
                }
                Ok(Step::Return(items[1].clone()))
            }
            SpecialForm::Quasiquote | SpecialForm::QuasiquoteExpand => {
                if items.len() != 2 {
                    return Err(special_arity(form, "1", items));
                }
                let expanded = quasiquote(&items[1]);
                if form == SpecialForm::Quasiquote {
                    Ok(Step::Continue(expanded, Rc::clone(env)))
                } else {
                    Ok(Step::Return(expanded))
                }
            }
            SpecialForm::Macroexpand => {
                if items.len() != 2 {
                    return Err(special_arity(form, "1", items));
                }
                // The operand is evaluated first, so `(macroexpand '(m x))` expands `(m x)`
                let target = self.eval(items[1].clone(), env)?;
                Ok(Step::Return(self.macroexpand(target, env)?))
            }
            SpecialForm::Try => self.eval_try(items, env),
            SpecialForm::Loop => self.eval_loop(items, env),
            SpecialForm::Recur => self.eval_recur(items, env),
            SpecialForm::Deftest => self.eval_deftest(items, env),
            SpecialForm::Testing => {
                if items.len() < 2 {
                    return Err(special_arity(form, "at least 1", items));
                }
                Ok(Step::Continue(body_form(&items[2..]), Rc::clone(env)))
            }
            SpecialForm::Ns | SpecialForm::Discard => Ok(Step::Return(Value::Nil)),
        }
    }

    /// `(def name value)` binds in the current frame
    fn eval_def(&mut self, items: &[Value], env: &Env) -> Result<Step> {
        if items.len() != 3 {
            return Err(special_arity(SpecialForm::Def, "2", items));
        }
        let name = items[1].as_symbol()?;
        let value = self.eval(items[2].clone(), env)?;
        tracing::debug!(symbol = name, "def");
        env.set(name, value.clone());
        Ok(Step::Return(value))
    }

    /// Evaluates `[name value ...]` pairs into `frame`, left to right
    fn bind_pairs(&mut self, bindings: &Value, frame: &Env, form: SpecialForm) -> Result<Vec<Rc<str>>> {
        let pairs = bindings.as_sequence()?;
        if pairs.len() % 2 != 0 {
            return Err(Error::InvalidArguments {
                tool: form.name().to_string(),
                reason: "bindings need an even number of forms".to_string(),
            });
        }
        let mut names = Vec::with_capacity(pairs.len() / 2);
        for pair in pairs.chunks(2) {
            let name: Rc<str> = Rc::from(pair[0].as_symbol()?);
            let value = self.eval(pair[1].clone(), frame)?;
            frame.set(Rc::clone(&name), value);
            names.push(name);
        }
        Ok(names)
    }

    fn eval_let(&mut self, items: &[Value], env: &Env) -> Result<Step> {
        if items.len() < 2 {
            return Err(special_arity(SpecialForm::LetStar, "at least 1", items));
        }
        let frame = Environment::child(env);
        self.bind_pairs(&items[1], &frame, SpecialForm::LetStar)?;
        Ok(Step::Continue(body_form(&items[2..]), frame))
    }

    fn eval_if(&mut self, items: &[Value], env: &Env) -> Result<Step> {
        if items.len() != 3 && items.len() != 4 {
            return Err(special_arity(SpecialForm::If, "2 to 3", items));
        }
        let branch = if self.eval(items[1].clone(), env)?.is_truthy() {
            items[2].clone()
        } else {
            items.get(3).cloned().unwrap_or(Value::Nil)
        };
        Ok(Step::Continue(branch, Rc::clone(env)))
    }

    fn eval_do(&mut self, items: &[Value], env: &Env) -> Result<Step> {
        let forms = &items[1..];
        let (last, init) = match forms.split_last() {
            Some(split) => split,
            None => return Ok(Step::Return(Value::Nil)),
        };
        for form in init {
            self.eval(form.clone(), env)?;
        }
        Ok(Step::Continue(last.clone(), Rc::clone(env)))
    }

    fn make_closure(name: Option<Rc<str>>, params: &Value, body: &[Value], env: &Env, is_macro: bool) -> Result<Value> {
        Ok(Value::closure(Closure {
            name,
            params: Params::parse(params)?,
            body: body_form(body),
            env: Rc::clone(env),
            is_macro,
        }))
    }

    /// `(fn name? [params] body...)`
    fn eval_fn(items: &[Value], env: &Env) -> Result<Step> {
        let (name, rest) = match items.get(1) {
            Some(Value::Symbol(name)) => (Some(Rc::clone(name)), &items[2..]),
            Some(_) => (None, &items[1..]),
            None => return Err(special_arity(SpecialForm::Fn, "at least 1", items)),
        };
        let (params, body) = rest.split_first().ok_or_else(|| Error::InvalidArguments {
            tool: "fn".to_string(),
            reason: "missing parameter vector".to_string(),
        })?;
        Ok(Step::Return(Self::make_closure(name, params, body, env, false)?))
    }

    /// `(defmacro name [params] body...)`
    fn eval_defmacro(items: &[Value], env: &Env) -> Result<Step> {
        if items.len() < 3 {
            return Err(special_arity(SpecialForm::Defmacro, "at least 2", items));
        }
        let name: Rc<str> = Rc::from(items[1].as_symbol()?);
        let mac = Self::make_closure(Some(Rc::clone(&name)), &items[2], &items[3..], env, true)?;
        tracing::debug!(symbol = %name, "defmacro");
        env.set(name, mac.clone());
        Ok(Step::Return(mac))
    }

    /// `(try body... (catch name handler...) (finally cleanup...))`
    ///
    /// Every failure is catchable; the handler sees it through
    /// [`Error::catch_value`]. Cleanup forms run for effect after the body or
    /// handler, whatever the outcome.
    fn eval_try(&mut self, items: &[Value], env: &Env) -> Result<Step> {
        let mut body = Vec::new();
        let mut catch: Option<(Rc<str>, &[Value])> = None;
        let mut finally: Option<&[Value]> = None;

        for form in &items[1..] {
            if form.is_call_to("catch") {
                let parts = form.as_sequence()?;
                let name = parts.get(1).ok_or_else(|| Error::InvalidArguments {
                    tool: "catch".to_string(),
                    reason: "expected a symbol to bind the caught value".to_string(),
                })?;
                catch = Some((Rc::from(name.as_symbol()?), &parts[2..]));
            } else if form.is_call_to("finally") {
                finally = Some(&form.as_sequence()?[1..]);
            } else {
                body.push(form.clone());
            }
        }

        let outcome = self.eval(body_form(&body), env);
        let outcome = match (outcome, catch) {
            (Err(err), Some((name, handler))) => {
                tracing::debug!(error = %err, "try caught failure");
                let frame = Environment::child(env);
                frame.set(name, err.catch_value());
                let handler = body_form(handler);
                if finally.is_none() {
                    return Ok(Step::Continue(handler, frame));
                }
                self.eval(handler, &frame)
            }
            (outcome, _) => outcome,
        };

        if let Some(cleanup) = finally {
            self.eval(body_form(cleanup), env)?;
        }
        outcome.map(Step::Return)
    }

    /// `(loop [name init ...] body...)`
    fn eval_loop(&mut self, items: &[Value], env: &Env) -> Result<Step> {
        if items.len() < 2 {
            return Err(special_arity(SpecialForm::Loop, "at least 1", items));
        }
        self.loop_counter += 1;
        let id = self.loop_counter;

        // Names are known before the initial values are evaluated; the frame
        // is created first so each init sees the bindings before it.
        let names: Vec<Rc<str>> = items[1]
            .as_sequence()?
            .iter()
            .step_by(2)
            .map(|name| name.as_symbol().map(Rc::<str>::from))
            .collect::<Result<_>>()?;
        let point = LoopPoint {
            id,
            bindings: Rc::from(names),
            body: body_form(&items[2..]),
        };
        let body = point.body.clone();
        let frame = Environment::loop_frame(env, point);
        let bound = self.bind_pairs(&items[1], &frame, SpecialForm::Loop)?;

        tracing::trace!(loop_id = id, bindings = bound.len(), "loop");
        Ok(Step::Continue(body, frame))
    }

    /// `(recur value...)` jumps back to the innermost enclosing `loop`
    ///
    /// Each iteration gets a fresh frame, so closures captured by an earlier
    /// iteration keep the values they saw.
    fn eval_recur(&mut self, items: &[Value], env: &Env) -> Result<Step> {
        let values = self.eval_each(&items[1..], env)?;
        let (frame, point) = env.find_loop().ok_or(Error::InvalidRecur)?;
        if values.len() != point.bindings.len() {
            return Err(Error::arity(
                "recur",
                point.bindings.len().to_string(),
                values.len(),
            ));
        }

        let outer = match frame.outer() {
            Some(outer) => Rc::clone(outer),
            None => Rc::clone(&frame),
        };
        let body = point.body.clone();
        let bindings = Rc::clone(&point.bindings);
        let next = Environment::loop_frame(&outer, point);
        for (name, value) in bindings.iter().zip(values) {
            next.set(Rc::clone(name), value);
        }
        Ok(Step::Continue(body, next))
    }

    /// `(deftest name body...)` records the vector of body results
    fn eval_deftest(&mut self, items: &[Value], env: &Env) -> Result<Step> {
        if items.len() < 2 {
            return Err(special_arity(SpecialForm::Deftest, "at least 1", items));
        }
        let name = items[1].as_symbol()?;
        let result = Value::vector(self.eval_each(&items[2..], env)?);
        env.set(name, result.clone());
        tracing::debug!(test = name, "deftest recorded");
        self.session.record(name, result.clone());
        Ok(Step::Return(result))
    }
}

impl Callback for LispEvaluator {
    fn apply(&mut self, f: &Value, args: &[Value]) -> Result<Value> {
        LispEvaluator::apply(self, f, args)
    }

    fn eval_root(&mut self, form: &Value) -> Result<Value> {
        let root = Rc::clone(&self.env);
        self.eval(form.clone(), &root)
    }

    fn gensym(&mut self, prefix: &str) -> Value {
        self.gensym_counter += 1;
        Value::symbol(format!("{}{}", prefix, self.gensym_counter))
    }
}
