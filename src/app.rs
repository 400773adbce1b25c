// src/app.rs
//
// Analyseur Q-pur — module App (racine)
// -------------------------------------
// - Déclare les sous-modules (etat.rs + vue.rs)
// - Ré-exporte AppAnalyseur pour main.rs
// - Fournit l’impl eframe::App (NATIF + WEB)
//
// Enter/Backspace : gérés dans vue.rs, quand le champ a le focus.

pub mod etat;
pub mod vue;

pub use etat::AppAnalyseur;

use eframe::egui;

impl eframe::App for AppAnalyseur {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ESC = effacer seulement l’expression (comme bouton "C")
        let esc = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if esc {
            self.clear_entree();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}
