//! Tests scientifiques (campagne) : invariants + robustesse + limites contrôlées.
//!
//! But : vérifier les propriétés publiques de l’analyseur sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//!
//! Notes :
//! - L’exactitude est opportuniste : tout ce qui reste rationnel est comparé
//!   en texte exact ("1/3"), le reste en flottant avec tolérance.
//! - Stress : profondeur modérée, la récursion du parseur et de l’évaluateur
//!   suit l’imbrication de l’expression.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use num_complex::Complex64;

use super::arbre::Bindings;
use super::erreur::{Error, EvalError, InputError};
use super::fonction::Fonctions;
use super::nombre::Number;
use super::parseur::Parser;

fn parser() -> Parser {
    Parser::new(Fonctions::standard(), &['x', 'y']).unwrap_or_else(|e| panic!("registre: {e}"))
}

fn x(v: impl Into<Number>) -> Bindings {
    Bindings::new().with('x', v)
}

fn eval_ok(expr: &str, valeurs: &Bindings) -> Number {
    parser()
        .parse(expr)
        .unwrap_or_else(|e| panic!("expr={expr:?} parse err={e}"))
        .evaluate_exact(valeurs)
        .unwrap_or_else(|e| panic!("expr={expr:?} eval err={e}"))
}

fn eval_err(expr: &str, valeurs: &Bindings) -> Error {
    match parser().parse(expr) {
        Ok(t) => t
            .evaluate_exact(valeurs)
            .expect_err(&format!("expr={expr:?} devrait échouer")),
        Err(e) => Error::Input(e),
    }
}

fn assert_exact_eq(expr: &str, valeurs: &Bindings, attendu: &str) {
    let v = eval_ok(expr, valeurs);
    assert!(v.est_exact(), "expr={expr:?} attendu exact, reçu {v:?}");
    assert_eq!(v.to_string(), attendu, "expr={expr:?}");
}

fn assert_proche(expr: &str, valeurs: &Bindings, attendu: f64) {
    let v = eval_ok(expr, valeurs).to_f64();
    assert!(
        (v - attendu).abs() <= 1e-12 * attendu.abs().max(1.0),
        "expr={expr:?} attendu {attendu} reçu {v}"
    );
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Précédence et associativité ------------------------ */

#[test]
fn sci_arithmetique_de_base() {
    let rien = Bindings::new();
    assert_exact_eq("2+3*4", &rien, "14");
    assert_exact_eq("(2+3)*4", &rien, "20");
    assert_exact_eq("2*3+4*5", &rien, "26");
    assert_exact_eq("((1))", &rien, "1");
}

#[test]
fn sci_associativite() {
    let rien = Bindings::new();
    // gauche : (10-3)-2, pas 10-(3-2)
    assert_exact_eq("10-3-2", &rien, "5");
    assert_exact_eq("64/4/2", &rien, "8");
    // droite : 2^(3^2), pas (2^3)^2
    assert_exact_eq("2^3^2", &rien, "512");
}

#[test]
fn sci_multiplication_implicite() {
    assert_exact_eq("3x", &x(2), "6");
    assert_exact_eq("2(x+1)", &x(2), "6");
    assert_exact_eq("(x+1)(x-1)", &x(3), "8");
    assert_exact_eq("2pi/pi", &Bindings::new(), "2");
}

#[test]
fn sci_signes_et_moins_unaire() {
    let rien = Bindings::new();
    assert_exact_eq("-2-3", &rien, "-5");
    assert_exact_eq("2--3", &rien, "5");
    assert_exact_eq("2+-3", &rien, "-1");
    assert_exact_eq("-(-6^x)", &x(0), "1");
    assert_exact_eq("-(-6^x)", &x(1), "6");
    assert_exact_eq("-6^2", &rien, "-36");
    assert_exact_eq("2*(-3+4)", &rien, "2");
    assert_exact_eq("2^-1", &rien, "1/2");
    assert_exact_eq("-2*3", &rien, "-6");
}

#[test]
fn sci_modulo_plancher() {
    let rien = Bindings::new();
    assert_exact_eq("7%3", &rien, "1");
    assert_exact_eq("-7%3", &rien, "2");
    assert_exact_eq("7%-3", &rien, "-2");
    assert_exact_eq("7.5%2", &rien, "3/2");
}

/* ------------------------ Exactitude ------------------------ */

#[test]
fn sci_exact_un_tiers() {
    let rien = Bindings::new();
    let tiers = eval_ok("1/3", &rien);
    assert_eq!(tiers.to_string(), "1/3");

    // addition répétée : exactement 1, sans dérive
    let mut acc = Number::from(0);
    for _ in 0..3 {
        acc = acc.add(&tiers).unwrap();
    }
    assert_eq!(acc, Number::from(1));
    assert_exact_eq("1/3+1/3+1/3", &rien, "1");
}

#[test]
fn sci_decimaux_exacts() {
    let rien = Bindings::new();
    assert_exact_eq("0.1+0.2", &rien, "3/10");
    assert_exact_eq("0.1+0.2-0.3", &rien, "0");
    // liaison flottante 0.1 : exactement 1/10
    assert_exact_eq("10x", &x(0.1), "1");
    assert_exact_eq("x*3", &x(0.1), "3/10");
}

#[test]
fn sci_puissances_et_racines() {
    let rien = Bindings::new();
    assert_exact_eq("4^0.5", &rien, "2");
    assert_exact_eq("(8/27)^(2/3)", &rien, "4/9");
    assert_exact_eq("(-8)^(1/3)", &rien, "-2");
    assert_exact_eq("sqrt(9/4)", &rien, "3/2");
    assert_proche("2^0.5", &rien, std::f64::consts::SQRT_2);
    assert_proche("(-2)^(1/3)", &rien, -(2f64.cbrt()));
}

#[test]
fn sci_fonctions_et_constantes() {
    let rien = Bindings::new();
    assert_proche("sin(x)^2", &x(1), 1f64.sin().powi(2));
    assert_proche("sin(x)^2+cos(x)^2", &x(0.7), 1.0);
    assert_exact_eq("max(1,-2,3)", &rien, "3");
    assert_exact_eq("min(x,1/2)", &x(1), "1/2");
    assert_exact_eq("abs(-5/2)", &rien, "5/2");
    assert_exact_eq("floor(-1/2)+ceil(1/2)", &rien, "0");
    assert_proche("pi", &rien, std::f64::consts::PI);
    assert_proche("e", &rien, std::f64::consts::E);
    assert_proche("ln(e)", &rien, 1.0);
    assert_exact_eq("cos(0)", &rien, "1");
}

/* ------------------------ Erreurs ------------------------ */

#[test]
fn sci_division_par_zero() {
    let rien = Bindings::new();
    let t = parser().parse("1/0").unwrap();
    assert_eq!(
        t.evaluate(&rien),
        Err(Error::Evaluation(EvalError::DivisionByZero))
    );
    assert_eq!(
        t.evaluate_exact(&rien),
        Err(Error::Evaluation(EvalError::DivisionByZero))
    );
    assert_eq!(
        eval_err("0^-1", &rien),
        Error::Evaluation(EvalError::DivisionByZero)
    );
    assert_eq!(
        eval_err("1/(x-x)", &x(3)),
        Error::Evaluation(EvalError::DivisionByZero)
    );
}

#[test]
fn sci_domaines() {
    let rien = Bindings::new();
    assert_eq!(
        eval_err("sqrt(-1)", &rien),
        Error::Evaluation(EvalError::Domain("sqrt".into()))
    );
    assert_eq!(
        eval_err("(-4)^(1/2)", &rien),
        Error::Evaluation(EvalError::Domain("^".into()))
    );
    assert_eq!(
        eval_err("ln(x)", &x(-1)),
        Error::Evaluation(EvalError::Domain("ln".into()))
    );
}

#[test]
fn sci_puissances_limites() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);
    let rien = Bindings::new();

    // numérateur i64::MIN en exposant : ni panique ni zéro exact
    let t = parser().parse("2^-9223372036854775808").unwrap();
    assert_eq!(t.evaluate_exact(&rien), Ok(Number::Real(0.0)));
    assert_eq!(t.evaluate(&rien), Ok(0.0));
    assert_exact_eq("(-1)^-9223372036854775808", &rien, "1");

    // exposants entiers au-delà de 4096 : exacts
    assert_exact_eq("2^5000/2^5000", &rien, "1");
    assert_exact_eq("1/(1/2)^5000 - 2^5000", &rien, "0");
    assert_exact_eq("(10^30+1)^2 - 10^60 - 2*10^30", &rien, "1");
    assert_exact_eq("(-1)^100000000000000000001", &rien, "-1");
    assert_exact_eq("1^(10^40)", &rien, "1");
    budget(t0, max);

    // trop gros pour l’exact : flottant, jamais un zéro exact
    let v = eval_ok("(1/2)^2000000", &rien);
    assert_eq!(v, Number::Real(0.0));
    assert_eq!(
        eval_err("1/(1/2)^2000000", &rien),
        Error::Evaluation(EvalError::DivisionByZero)
    );
    assert_eq!(
        eval_err("2^2000000", &rien),
        Error::Evaluation(EvalError::Domain("^".into()))
    );
    budget(t0, max);
}

#[test]
fn sci_jeton_inconnu_avant_evaluation() {
    // échec au parse : aucune évaluation tentée
    assert_eq!(
        parser().parse("foo(x)"),
        Err(InputError::InvalidToken("foo".into()))
    );
    assert_eq!(parser().parse("2*z"), Err(InputError::InvalidToken("z".into())));
}

/* ------------------------ Déterminisme ------------------------ */

#[test]
fn sci_idempotence() {
    let p = parser();
    let b = Bindings::new().with('x', 3).with('y', 0.25);
    for s in ["3x+1-(-6^x)*sin(y/2+2)", "max(x,y)^2%7", "2(x+1)(y-1)/3"] {
        let t1 = p.parse(s).unwrap();
        let t2 = p.parse(s).unwrap();
        assert_eq!(t1, t2, "expr={s:?}");
        assert_eq!(t1.evaluate_exact(&b), t1.evaluate_exact(&b), "expr={s:?}");
        assert_eq!(t1.evaluate(&b), t2.evaluate(&b), "expr={s:?}");
    }
}

#[test]
fn sci_equation_vers_racine() {
    let t = parser().parse_equation("x^2 = 4").unwrap();
    assert_eq!(t.evaluate_exact(&x(2)).unwrap(), Number::from(0));
    assert_eq!(t.evaluate_exact(&x(3)).unwrap(), Number::from(5));
}

/* ------------------------ Complexe et chemin rapide ------------------------ */

#[test]
fn sci_complexe() {
    let p = parser();
    let i = Complex64::new(0.0, 1.0);

    let v = p
        .parse("x^2+1")
        .unwrap()
        .evaluate_complex(&HashMap::from([('x', i)]))
        .unwrap();
    assert!(v.norm() < 1e-12, "{v}");

    let pi_i = Complex64::new(0.0, std::f64::consts::PI);
    let v = p
        .parse("exp(x)")
        .unwrap()
        .evaluate_complex(&HashMap::from([('x', pi_i)]))
        .unwrap();
    assert!((v - Complex64::new(-1.0, 0.0)).norm() < 1e-12, "{v}");

    let v = p
        .parse("sqrt(x)")
        .unwrap()
        .evaluate_complex(&HashMap::from([('x', Complex64::new(-4.0, 0.0))]))
        .unwrap();
    assert!((v - Complex64::new(0.0, 2.0)).norm() < 1e-12, "{v}");
}

#[test]
fn sci_chemin_rapide_egal_evaluate() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    let t = parser().parse("3x^2+2xy-y/4").unwrap();
    let o = t.ordered(&['x', 'y']).unwrap();

    for k in -20..=20 {
        budget(t0, max);
        let (vx, vy) = (k as f64 / 4.0, (k * k) as f64 / 8.0);
        let lent = t.evaluate(&Bindings::new().with('x', vx).with('y', vy)).unwrap();
        let rapide = o.evaluate_fast(&[vx, vy]).unwrap();
        assert!(
            (lent - rapide).abs() <= 1e-9 * lent.abs().max(1.0),
            "x={vx} y={vy}: {lent} vs {rapide}"
        );
    }
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_profondeur_sqrt_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    // sqrt(4) -> 2 ; (2)^2 -> 4 ; on alterne pour rester rationnel
    let mut expr = "4".to_string();
    for k in 0..60 {
        expr = if k % 2 == 0 {
            format!("sqrt({expr})")
        } else {
            format!("({expr})^2")
        };
        budget(t0, max);
    }

    assert_exact_eq(&expr, &Bindings::new(), "4");
    budget(t0, max);
}

#[test]
fn sci_stress_taille_somme_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    let mut expr = String::new();
    for k in 0..80 {
        if k > 0 {
            expr.push_str(" + ");
        }
        expr.push_str("1/2");
    }

    // 80*(1/2)=40
    assert_exact_eq(&expr, &Bindings::new(), "40");
    budget(t0, max);
}

#[test]
fn sci_stress_bigint_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    // gros numérateur contrôlé (100 chiffres) : (10^100 - 1)/7 + 1/7 = 10^100/7
    let big = "9".repeat(100);
    let expr = format!("{big}/7 + 1/7");
    let attendu = format!("1{}/7", "0".repeat(100));

    assert_exact_eq(&expr, &Bindings::new(), &attendu);
    budget(t0, max);
}
