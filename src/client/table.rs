//! Plain-text tables for the terminal front-end
//!
//! Missing associations render as `N/A`; an empty list renders the page's
//! empty-state message instead of a header with no rows.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::models::{
    cart::Cart,
    localisation::Localisation,
    material_type::MaterialType,
    materiel::Materiel,
    request::ServiceRequest,
    user::User,
};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_FILTER_RESULTS: &str = "Aucun matériel trouvé avec les critères de filtrage.";
pub const NO_REQUESTS: &str = "Aucune demande trouvée.";
pub const EMPTY_CART: &str = "Votre panier est vide.";
pub const NO_RECORDS: &str = "Aucun élément.";
pub const DELETED_USER: &str = "Utilisateur supprimé";

pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    empty_message: &'static str,
}

impl Table {
    pub fn new(headers: Vec<&'static str>, empty_message: &'static str) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            empty_message,
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "{}", self.empty_message);
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        write_row(f, self.headers.iter().copied(), &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &self.rows {
            write_row(f, row.iter().map(String::as_str), &widths)?;
        }
        Ok(())
    }
}

fn write_row<'a>(f: &mut fmt::Formatter<'_>, cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> fmt::Result {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(f, "{}", padded.join(" | ").trim_end())
}

pub fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn category(materiel: &Materiel) -> String {
    or_na(materiel.material_type.as_ref().map(|t| t.name.as_str()))
}

fn location(materiel: &Materiel) -> String {
    materiel
        .localisation
        .as_ref()
        .map(Localisation::label)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn materiel_table(materiels: &[Materiel], empty_message: &'static str) -> Table {
    let mut table = Table::new(
        vec!["ID", "Type", "Référence", "Localisation", "Livraison", "Reprise"],
        empty_message,
    );
    for m in materiels {
        table.push(vec![
            m.id.to_string(),
            category(m),
            or_na(m.reference_interne.as_deref()),
            location(m),
            date(m.date_livraison),
            date(m.date_reprise),
        ]);
    }
    table
}

pub fn materiels(materiels: &[Materiel]) -> Table {
    materiel_table(materiels, NO_RECORDS)
}

/// Filter results; an empty result set shows [`NO_FILTER_RESULTS`]
pub fn filter_results(materiels: &[Materiel]) -> Table {
    materiel_table(materiels, NO_FILTER_RESULTS)
}

pub fn localisations(localisations: &[Localisation]) -> Table {
    let mut table = Table::new(
        vec!["ID", "Établissement", "Secteur", "Chambre", "Résident", "Propriétaire"],
        NO_RECORDS,
    );
    for l in localisations {
        table.push(vec![
            l.id.to_string(),
            l.nom_etablissement.clone(),
            l.secteur.clone(),
            l.numero_chambre.clone(),
            l.nom_complet_resident.clone(),
            l.owner_id.map(|id| id.to_string()).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ]);
    }
    table
}

pub fn material_types(types: &[MaterialType]) -> Table {
    let mut table = Table::new(vec!["ID", "Nom"], NO_RECORDS);
    for t in types {
        table.push(vec![t.id.to_string(), t.name.clone()]);
    }
    table
}

pub fn users(users: &[User]) -> Table {
    let mut table = Table::new(vec!["ID", "Utilisateur", "Admin"], NO_RECORDS);
    for u in users {
        table.push(vec![
            u.id.to_string(),
            u.username.clone(),
            if u.is_admin { "oui" } else { "non" }.to_string(),
        ]);
    }
    table
}

pub fn cart(cart: &Cart) -> Table {
    let mut table = Table::new(
        vec!["ID", "Demande", "Type", "Référence", "Localisation", "Description"],
        EMPTY_CART,
    );
    for item in &cart.items {
        table.push(vec![
            item.id.to_string(),
            item.request_type.to_string(),
            category(&item.materiel),
            or_na(item.materiel.reference_interne.as_deref()),
            location(&item.materiel),
            item.description.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub fn requests(requests: &[ServiceRequest]) -> Table {
    let mut table = Table::new(
        vec!["ID", "Date", "Demandeur", "Demande", "Type", "Référence", "Localisation", "Statut", "Description"],
        NO_REQUESTS,
    );
    for r in requests {
        let materiel = r.materiel.as_ref();
        table.push(vec![
            r.id.to_string(),
            r.created_at.format("%d/%m/%Y %H:%M").to_string(),
            r.user
                .as_ref()
                .map(|u| u.username.clone())
                .unwrap_or_else(|| DELETED_USER.to_string()),
            r.request_type.to_string(),
            materiel.map(category).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            or_na(materiel.and_then(|m| m.reference_interne.as_deref())),
            materiel.map(location).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            r.status.to_string(),
            r.description.clone().unwrap_or_default(),
        ]);
    }
    table
}
