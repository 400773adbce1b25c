// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// - Même AppAnalyseur (etat.rs) pour natif + wasm
// - Clavier : Enter évalue, Backspace efface (quand le champ est focus)
// - Tactile : gros boutons, focus redonné après clic (focus_entree)
//
// PAS de Key::NumEnter (n’existe pas dans egui 0.33.x).

use eframe::egui;

use analyseur_qpur::noyau::eval_expression;

use super::etat::{AppAnalyseur, Demarche};

/// Motifs retirés d’un bloc par DEL.
const MOTIFS_BACKSPACE: [&str; 10] = [
    "sqrt(", "sin(", "cos(", "tan(", "max(", "min(", "exp(", "ln(", "abs(", "pi",
];

impl AppAnalyseur {
    /// UI principale : appelée depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Analyseur Q-pur");
                ui.add_space(6.0);

                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultats(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_demarche(ui);
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Expression :");

        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.entree)
                .desired_width(ui.available_width())
                .hint_text("Ex: 3x^2 - 1/3, -(-6^x), max(x, y, 1/2), x^2 = 2y")
                .id_source("entree_edit")
                .code_editor(),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if resp.has_focus() && enter {
            self.eval_via_noyau();
            self.focus_entree = true;
        }

        let backspace = ui.input(|i| i.key_pressed(egui::Key::Backspace));
        if resp.has_focus() && backspace {
            self.backspace_entree();
            self.focus_entree = true;
        }

        ui.add_space(4.0);

        egui::Grid::new("reglages_qpur")
            .num_columns(2)
            .spacing([6.0, 4.0])
            .show(ui, |ui| {
                ui.label("Valeurs :");
                ui.add(
                    egui::TextEdit::singleline(&mut self.valeurs)
                        .desired_width(ui.available_width())
                        .hint_text("x=2, y=1/3")
                        .id_source("valeurs_edit")
                        .code_editor(),
                );
                ui.end_row();

                ui.label("Symboles :");
                ui.add(
                    egui::TextEdit::singleline(&mut self.symboles)
                        .desired_width(ui.available_width())
                        .hint_text("x y")
                        .id_source("symboles_edit")
                        .code_editor(),
                );
                ui.end_row();
            });

        ui.add_space(6.0);

        // Contrat: C = expression ; CLR = résultats ; AC = tout
        ui.horizontal(|ui| {
            self.bouton_action(ui, "C", "Efface seulement l’expression", Action::ClearEntree);
            self.bouton_action(
                ui,
                "CLR",
                "Efface résultats + erreur + démarche",
                Action::ClearResultats,
            );
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);

            ui.separator();

            ui.label("Lecture :");
            let mut d = self.digits as u32;
            let resp = ui.add(
                egui::DragValue::new(&mut d)
                    .speed(1)
                    .range(0..=200)
                    .suffix(" chiffres"),
            );
            if resp.changed() {
                self.set_digits(d as usize);
            }
        });

        ui.add_space(8.0);

        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "(", "(", InsertKind::OpenParen);
            self.bouton_insert(ui, ")", ")", InsertKind::CloseParen);
            self.bouton_insert(ui, ",", ",", InsertKind::CloseParen);

            self.bouton_insert(ui, "+", "+", InsertKind::Op);
            self.bouton_insert(ui, "-", "-", InsertKind::Op);
            self.bouton_insert(ui, "*", "*", InsertKind::Op);
            self.bouton_insert(ui, "/", "/", InsertKind::Op);
            self.bouton_insert(ui, "%", "%", InsertKind::Op);
            self.bouton_insert(ui, "^", "^", InsertKind::Op);
            self.bouton_insert(ui, "=", "=", InsertKind::Op);

            ui.separator();

            self.bouton_insert(ui, "pi", "pi", InsertKind::Word);
            self.bouton_insert(ui, "sqrt", "sqrt(", InsertKind::Func);
            self.bouton_insert(ui, "sin", "sin(", InsertKind::Func);
            self.bouton_insert(ui, "cos", "cos(", InsertKind::Func);
            self.bouton_insert(ui, "tan", "tan(", InsertKind::Func);
            self.bouton_insert(ui, "ln", "ln(", InsertKind::Func);
            self.bouton_insert(ui, "exp", "exp(", InsertKind::Func);
            self.bouton_insert(ui, "max", "max(", InsertKind::Func);

            ui.separator();

            self.bouton_insert(ui, "x", "x", InsertKind::Word);
            self.bouton_insert(ui, "y", "y", InsertKind::Word);

            ui.add_space(10.0);

            let eval = ui.add_sized([80.0, 32.0], egui::Button::new("Évaluer"));
            if eval.clicked() {
                self.eval_via_noyau();
                self.focus_entree = true;
            }
        });

        ui.add_space(8.0);

        self.ui_pave_numerique(ui);

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_pave_numerique(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("pave_numerique_qpur")
            .num_columns(4)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                self.bouton_insert(ui, "7", "7", InsertKind::Digit);
                self.bouton_insert(ui, "8", "8", InsertKind::Digit);
                self.bouton_insert(ui, "9", "9", InsertKind::Digit);
                self.bouton_action(ui, "DEL", "Efface le dernier symbole", Action::Backspace);
                ui.end_row();

                self.bouton_insert(ui, "4", "4", InsertKind::Digit);
                self.bouton_insert(ui, "5", "5", InsertKind::Digit);
                self.bouton_insert(ui, "6", "6", InsertKind::Digit);
                self.bouton_insert(ui, "/", "/", InsertKind::Op);
                ui.end_row();

                self.bouton_insert(ui, "1", "1", InsertKind::Digit);
                self.bouton_insert(ui, "2", "2", InsertKind::Digit);
                self.bouton_insert(ui, "3", "3", InsertKind::Digit);
                self.bouton_insert(ui, ".", ".", InsertKind::Digit);
                ui.end_row();

                self.bouton_insert(ui, "0", "0", InsertKind::Digit);
                ui.label("");
                ui.label("");
                ui.label("");
                ui.end_row();
            });
    }

    /// Backspace “intelligent” : retire d’un coup les motifs ("sin(", "pi", ...).
    fn backspace_entree(&mut self) {
        retirer_dernier(&mut self.entree);
    }

    fn ui_resultats(&mut self, ui: &mut egui::Ui) {
        ui.label("EXACT :");
        Self::champ_monospace(ui, "exact_out", &self.exact, 2);

        ui.add_space(6.0);

        ui.label("Réel (f64) :");
        Self::champ_monospace(ui, "reel_out", &self.reel, 1);

        ui.add_space(6.0);

        ui.label("Lecture décimale :");
        if self.lecture_dispo {
            Self::champ_monospace(ui, "lecture_out", &self.lecture, 2);
        } else {
            ui.monospace("indisponible");
        }
    }

    fn ui_demarche(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Démarche")
            .default_open(true)
            .show(ui, |ui| {
                Self::champ_demarche(ui, "Jetons", "demarche_jetons", &self.demarche.jetons);
                Self::champ_demarche(ui, "Arbre", "demarche_arbre", &self.demarche.arbre);
                Self::champ_demarche(ui, "Symboles", "demarche_symboles", &self.demarche.symboles);
                Self::champ_demarche(ui, "Note", "demarche_note", &self.demarche.note);
            });
    }

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        Self::champ_monospace(ui, id, contenu, 2);
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::ClearResultats => self.clear_resultats(),
                Action::ResetTotal => self.reset_total(),
                Action::Backspace => self.backspace_entree(),
            }
            self.focus_entree = true;
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str, kind: InsertKind) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if resp.clicked() && !to_insert.is_empty() {
            inserer(&mut self.entree, to_insert, kind);
            self.focus_entree = true;
        }
    }

    /// Évalue via le noyau, puis dépose EXACT / réel / lecture / démarche dans l’état.
    fn eval_via_noyau(&mut self) {
        let s = self.entree.trim();
        if s.is_empty() {
            self.set_erreur("Entrée vide");
            return;
        }

        let symboles = self.symboles_autorises();
        match eval_expression(s, &symboles, &self.valeurs, self.digits) {
            Ok(r) => {
                let d_ui = Demarche {
                    jetons: r.demarche.jetons,
                    arbre: r.demarche.arbre,
                    symboles: r.demarche.symboles,
                    note: r.demarche.note,
                };
                self.set_resultats(r.reel, r.exact.to_string(), r.lecture, d_ui);
            }
            Err(e) => {
                log::debug!("évaluation refusée: {e}");
                self.set_erreur(e.to_string());
            }
        }
    }
}

/* ------------------------ Édition du texte (hors egui) ------------------------ */

fn retirer_espaces_finaux(s: &mut String) {
    while s.ends_with(' ') {
        s.pop();
    }
}

fn retirer_dernier(entree: &mut String) {
    if entree.is_empty() {
        return;
    }
    retirer_espaces_finaux(entree);

    match MOTIFS_BACKSPACE.iter().find(|pat| entree.ends_with(**pat)) {
        Some(pat) => entree.truncate(entree.len() - pat.len()),
        None => {
            entree.pop();
        }
    }
    retirer_espaces_finaux(entree);
}

fn inserer(entree: &mut String, to_insert: &str, kind: InsertKind) {
    match kind {
        InsertKind::CloseParen => {
            retirer_espaces_finaux(entree);
            entree.push_str(to_insert);
        }
        InsertKind::OpenParen | InsertKind::Func => {
            let last = entree.chars().rev().find(|c| !c.is_whitespace());
            if let Some(c) = last {
                if c.is_ascii_digit() || c.is_ascii_alphabetic() || c == ')' {
                    entree.push(' ');
                }
            }
            entree.push_str(to_insert);
        }
        InsertKind::Op => {
            retirer_espaces_finaux(entree);
            if !entree.is_empty() {
                entree.push(' ');
            }
            entree.push_str(to_insert);
            entree.push(' ');
        }
        InsertKind::Digit => entree.push_str(to_insert),
        InsertKind::Word => {
            // espace si juste avant c’est un chiffre ou ')'
            if !entree.ends_with(char::is_whitespace) {
                if let Some(c) = entree.chars().last() {
                    if c.is_ascii_digit() || c == ')' {
                        entree.push(' ');
                    }
                }
            }
            entree.push_str(to_insert);
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ClearResultats,
    ResetTotal,
    Backspace,
}

#[derive(Clone, Copy, Debug)]
enum InsertKind {
    Digit,
    Word,
    Func,
    Op,
    OpenParen,
    CloseParen,
}
