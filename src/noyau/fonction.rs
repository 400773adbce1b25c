//! Table de fonctions.
//!
//! Un nœud d’opération ne connaît qu’un `Function` : soit un opérateur intégré
//! (variante fixe), soit une fonction nommée enregistrée par l’appelant.
//! Les deux passent par le trait `Callable` (nom, arité, application réelle/complexe).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use super::donnees::Operator;
use super::erreur::EvalError;
use super::nombre::{rational_root_exact, Number};

type FnReel = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;
type FnExact = Arc<dyn Fn(&[BigRational]) -> Option<BigRational> + Send + Sync>;
type FnComplexe = Arc<dyn Fn(&[Complex64]) -> Complex64 + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepte(self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(k) => write!(f, "{k}"),
            Arity::AtLeast(k) => write!(f, "au moins {k}"),
        }
    }
}

pub trait Callable {
    fn name(&self) -> &str;
    fn arity(&self) -> Arity;
    fn apply(&self, args: &[Number]) -> Result<Number, EvalError>;
    fn apply_complex(&self, args: &[Complex64]) -> Result<Complex64, EvalError>;
}

/* ------------------------ Fonctions nommées ------------------------ */

/// Fonction enregistrée : forme réelle obligatoire, formes exacte et complexe optionnelles.
///
/// La forme exacte est tentée quand tous les arguments sont exacts ; si elle
/// renvoie `None`, on retombe sur la forme réelle.
#[derive(Clone)]
pub struct NamedFunction {
    arite: Arity,
    reel: FnReel,
    exact: Option<FnExact>,
    complexe: Option<FnComplexe>,
}

impl NamedFunction {
    pub fn new(arite: Arity, f: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            arite,
            reel: Arc::new(f),
            exact: None,
            complexe: None,
        }
    }

    pub fn unary(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::new(Arity::Exactly(1), move |a| f(a[0]))
    }

    pub fn binary(f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::new(Arity::Exactly(2), move |a| f(a[0], a[1]))
    }

    pub fn variadic(min: usize, f: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self::new(Arity::AtLeast(min), f)
    }

    pub fn with_exact(
        mut self,
        f: impl Fn(&[BigRational]) -> Option<BigRational> + Send + Sync + 'static,
    ) -> Self {
        self.exact = Some(Arc::new(f));
        self
    }

    pub fn with_complex(
        mut self,
        f: impl Fn(&[Complex64]) -> Complex64 + Send + Sync + 'static,
    ) -> Self {
        self.complexe = Some(Arc::new(f));
        self
    }

    pub fn arity(&self) -> Arity {
        self.arite
    }
}

impl fmt::Debug for NamedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedFunction")
            .field("arite", &self.arite)
            .field("exact", &self.exact.is_some())
            .field("complexe", &self.complexe.is_some())
            .finish()
    }
}

/* ------------------------ Function (référence portée par l’arbre) ------------------------ */

#[derive(Clone, Debug)]
pub enum Function {
    Operator(Operator),
    Named { name: Arc<str>, def: NamedFunction },
}

/// Égalité structurelle : même opérateur, ou même nom et même arité.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Function::Operator(a), Function::Operator(b)) => a == b,
            (Function::Named { name: a, def: da }, Function::Named { name: b, def: db }) => {
                a == b && da.arite == db.arite
            }
            _ => false,
        }
    }
}

impl Callable for Operator {
    fn name(&self) -> &str {
        self.symbole()
    }

    fn arity(&self) -> Arity {
        Arity::Exactly(self.arite())
    }

    fn apply(&self, args: &[Number]) -> Result<Number, EvalError> {
        match (self, args) {
            (Operator::Neg, [x]) => Ok(x.neg()),
            (Operator::Add, [a, b]) => a.add(b),
            (Operator::Sub, [a, b]) => a.sub(b),
            (Operator::Mul, [a, b]) => a.mul(b),
            (Operator::Div, [a, b]) => a.div(b),
            (Operator::Mod, [a, b]) => a.rem(b),
            (Operator::Pow, [a, b]) => a.pow(b),
            _ => Err(EvalError::Domain(self.symbole().to_string())),
        }
    }

    fn apply_complex(&self, args: &[Complex64]) -> Result<Complex64, EvalError> {
        let v = match (self, args) {
            (Operator::Neg, [x]) => -x,
            (Operator::Add, [a, b]) => a + b,
            (Operator::Sub, [a, b]) => a - b,
            (Operator::Mul, [a, b]) => a * b,
            (Operator::Div, [a, b]) => {
                if b.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                a / b
            }
            (Operator::Mod, [a, b]) => {
                if a.im != 0.0 || b.im != 0.0 {
                    return Err(EvalError::NoComplexForm("%".into()));
                }
                if b.re == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Complex64::new(a.re - b.re * (a.re / b.re).floor(), 0.0)
            }
            (Operator::Pow, [a, b]) => puissance_complexe(*a, *b)?,
            _ => return Err(EvalError::Domain(self.symbole().to_string())),
        };
        if v.re.is_nan() || v.im.is_nan() {
            return Err(EvalError::Domain(self.symbole().to_string()));
        }
        Ok(v)
    }
}

/// Exposant entier : multiplications répétées (exactes sur i*i) ; sinon powc.
fn puissance_complexe(a: Complex64, b: Complex64) -> Result<Complex64, EvalError> {
    if a.is_zero() {
        return if b.re > 0.0 {
            Ok(Complex64::zero())
        } else if b.is_zero() {
            Ok(Complex64::new(1.0, 0.0))
        } else {
            Err(EvalError::DivisionByZero)
        };
    }
    if b.im == 0.0 && b.re.fract() == 0.0 && b.re.abs() <= i32::MAX as f64 {
        return Ok(a.powi(b.re as i32));
    }
    Ok(a.powc(b))
}

impl Callable for Function {
    fn name(&self) -> &str {
        match self {
            Function::Operator(op) => op.name(),
            Function::Named { name, .. } => &**name,
        }
    }

    fn arity(&self) -> Arity {
        match self {
            Function::Operator(op) => op.arity(),
            Function::Named { def, .. } => def.arite,
        }
    }

    fn apply(&self, args: &[Number]) -> Result<Number, EvalError> {
        let (name, def) = match self {
            Function::Operator(op) => return op.apply(args),
            Function::Named { name, def } => (name, def),
        };

        if let Some(exact) = &def.exact {
            let rats: Option<Vec<BigRational>> = args.iter().map(|a| a.exact().cloned()).collect();
            if let Some(r) = rats.as_deref().and_then(|r| exact(r)) {
                return Ok(Number::Exact(r));
            }
        }

        let reels: Vec<f64> = args.iter().map(Number::to_f64).collect();
        Number::depuis_reel((def.reel)(&reels), name)
    }

    fn apply_complex(&self, args: &[Complex64]) -> Result<Complex64, EvalError> {
        let (name, def) = match self {
            Function::Operator(op) => return op.apply_complex(args),
            Function::Named { name, def } => (name, def),
        };

        let v = match &def.complexe {
            Some(f) => f(args),
            // pas de forme complexe : acceptable seulement sur l’axe réel
            None if args.iter().all(|a| a.im == 0.0) => {
                let reels: Vec<f64> = args.iter().map(|a| a.re).collect();
                Complex64::new((def.reel)(&reels), 0.0)
            }
            None => return Err(EvalError::NoComplexForm(name.to_string())),
        };
        if !v.re.is_finite() || !v.im.is_finite() {
            return Err(EvalError::Domain(name.to_string()));
        }
        Ok(v)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/* ------------------------ Registre ------------------------ */

/// Registre nom -> fonction, construit par l’appelant et passé au parseur.
#[derive(Clone, Debug, Default)]
pub struct Fonctions {
    table: BTreeMap<String, NamedFunction>,
}

impl Fonctions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, f: NamedFunction) -> Self {
        self.insert(name, f);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, f: NamedFunction) {
        self.table.insert(name.into(), f);
    }

    pub fn extend(&mut self, autres: Fonctions) {
        self.table.extend(autres.table);
    }

    pub fn get(&self, name: &str) -> Option<Function> {
        self.table
            .get_key_value(name)
            .map(|(k, def)| Function::Named {
                name: Arc::from(k.as_str()),
                def: def.clone(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Fonctions usuelles, avec formes complexes et formes exactes quand elles existent.
    pub fn standard() -> Self {
        Fonctions::new()
            .with("sin", NamedFunction::unary(f64::sin).with_complex(|a| a[0].sin()))
            .with("cos", NamedFunction::unary(f64::cos).with_complex(|a| a[0].cos()))
            .with("tan", NamedFunction::unary(f64::tan).with_complex(|a| a[0].tan()))
            .with("asin", NamedFunction::unary(f64::asin).with_complex(|a| a[0].asin()))
            .with("acos", NamedFunction::unary(f64::acos).with_complex(|a| a[0].acos()))
            .with("atan", NamedFunction::unary(f64::atan).with_complex(|a| a[0].atan()))
            .with("sinh", NamedFunction::unary(f64::sinh).with_complex(|a| a[0].sinh()))
            .with("cosh", NamedFunction::unary(f64::cosh).with_complex(|a| a[0].cosh()))
            .with("tanh", NamedFunction::unary(f64::tanh).with_complex(|a| a[0].tanh()))
            .with("exp", NamedFunction::unary(f64::exp).with_complex(|a| a[0].exp()))
            .with("ln", NamedFunction::unary(f64::ln).with_complex(|a| a[0].ln()))
            .with("log", NamedFunction::unary(f64::log10).with_complex(|a| a[0].log10()))
            .with(
                "sqrt",
                NamedFunction::unary(f64::sqrt)
                    .with_exact(|a| rational_root_exact(&a[0], 2))
                    .with_complex(|a| a[0].sqrt()),
            )
            .with(
                "abs",
                NamedFunction::unary(f64::abs)
                    .with_exact(|a| Some(a[0].abs()))
                    .with_complex(|a| Complex64::new(a[0].norm(), 0.0)),
            )
            .with(
                "floor",
                NamedFunction::unary(f64::floor).with_exact(|a| Some(a[0].floor())),
            )
            .with(
                "ceil",
                NamedFunction::unary(f64::ceil).with_exact(|a| Some(a[0].ceil())),
            )
            .with(
                "max",
                NamedFunction::variadic(1, |a| a.iter().copied().fold(f64::NEG_INFINITY, f64::max))
                    .with_exact(|a| a.iter().max().cloned()),
            )
            .with(
                "min",
                NamedFunction::variadic(1, |a| a.iter().copied().fold(f64::INFINITY, f64::min))
                    .with_exact(|a| a.iter().min().cloned()),
            )
    }
}
