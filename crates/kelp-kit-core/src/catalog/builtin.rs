//! Built-in KELP catalog.

use super::Catalog;
use crate::models::{
    BaseKit, Bundle, Component, ComponentLine, Module, ServiceLevel, SharedBottle, ShippingTier,
};

impl Catalog {
    /// The KELP laboratory catalog.
    pub fn kelp() -> Self {
        Self {
            base: base_kit(),
            modules: modules(),
            bundles: bundles(),
            components: components(),
            shipping_tiers: shipping_tiers(),
        }
    }
}

fn base_kit() -> BaseKit {
    BaseKit {
        unit_cost: 9.50,
        unit_weight: 1.5,
        shipping_box: "Box_01".into(),
        labels: "Label_01".into(),
        instructions: "Inst_01".into(),
        chain_of_custody: "Form_01".into(),
        gloves: "PPE_01".into(),
        special_gloves: "PPE_PFAS".into(),
        packaging: "Pack_01".into(),
        special_packaging: "Pack_PFAS".into(),
    }
}

fn component(part: &str, description: &str, location: &str) -> Component {
    Component {
        part: part.into(),
        description: description.into(),
        location: location.into(),
    }
}

fn components() -> Vec<Component> {
    vec![
        // Base kit
        component("Form_01", "Chain-of-Custody form", "Shelf A1"),
        component("Label_01", "Waterproof labels (sheet)", "Shelf A2"),
        component("PPE_01", "Nitrile gloves (pairs)", "Shelf A3"),
        component("Pack_01", "Bubble wrap/dividers", "Shelf A4"),
        component("Box_01", "Shipping box (standard)", "Shelf A5"),
        component("Inst_01", "Instruction sheet", "Shelf A6"),
        // Bottles
        component("Bottle_GenChem", "250mL HDPE bottle (general chemistry)", "Shelf B1"),
        component("Bottle_02", "250mL HDPE bottle (trace-metal clean)", "Shelf B2"),
        component("Bottle_03", "250mL PP bottle (anions)", "Shelf B3"),
        component("Bottle_04", "500mL PP bottle (nutrients)", "Shelf B4"),
        component("Bottle_Sterile", "100mL sterile bottle", "Shelf B5"),
        component("Bottle_05", "250mL PP bottle (PFAS-free cert)", "Shelf C1"),
        // PFAS materials
        component("Cap_PFAS", "PP caps w/ PE liners", "Shelf C2"),
        component("Label_PFAS", "PFAS-free labels", "Shelf C3"),
        component("PPE_PFAS", "PFAS-free nitrile gloves (pairs)", "Shelf E1"),
        component("Pack_PFAS", "PFAS-free bottle sleeves (no foam)", "Shelf E2"),
        // Preservatives
        component("Pres_HNO3", "HNO3 preservative vial (2mL)", "Shelf D1"),
        component("Pres_H2SO4", "H2SO4 preservative vial (2mL)", "Shelf D2"),
        component("Pres_Thio", "Sodium thiosulfate tablet", "Shelf D3"),
        // Compliance shipping
        component("Cool_12L", "Cooler bag (12L insulated)", "Shelf F1"),
        component("Ice_Gel", "Ice packs (gel)", "Shelf F2"),
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn modules() -> Vec<Module> {
    vec![
        Module {
            id: "general_chemistry".into(),
            name: "MODULE A: General Chemistry".into(),
            description: "Alkalinity, Hardness, Turbidity, TDS".into(),
            tests: strings(&[
                "Alkalinity",
                "Total Hardness",
                "Calcium Hardness",
                "Turbidity",
                "TDS",
            ]),
            preservation: "NONE".into(),
            unit_cost: 2.50,
            shared_cost: 1.00,
            bottle_part: "Bottle_GenChem".into(),
            bottle_count: 1,
            accessories: Vec::new(),
            weight: 0.6,
            shares_with: Some(SharedBottle {
                partner: "anions".into(),
                reduced: false,
            }),
            requires_special_handling: false,
            special_warning: None,
        },
        Module {
            id: "metals".into(),
            name: "MODULE B: Metals (EPA 200.8)".into(),
            description: "Lead, Copper, Arsenic, Chromium, Zinc, Iron, Manganese".into(),
            tests: strings(&[
                "Lead (Pb)",
                "Copper (Cu)",
                "Arsenic (As)",
                "Chromium (Cr)",
                "Zinc (Zn)",
                "Iron (Fe)",
                "Manganese (Mn)",
                "Other trace metals",
            ]),
            preservation: "HNO3 to pH <2".into(),
            unit_cost: 5.00,
            shared_cost: 5.00,
            bottle_part: "Bottle_02".into(),
            bottle_count: 1,
            accessories: vec![ComponentLine::new("Pres_HNO3", 1)],
            weight: 0.6,
            shares_with: None,
            requires_special_handling: false,
            special_warning: None,
        },
        Module {
            id: "anions".into(),
            name: "MODULE C: Anions (EPA 300.1)".into(),
            description: "Chloride, Sulfate, Nitrate, Fluoride".into(),
            tests: strings(&[
                "Chloride (Cl-)",
                "Sulfate (SO4 2-)",
                "Nitrate (NO3-)",
                "Fluoride (F-)",
            ]),
            preservation: "NONE".into(),
            unit_cost: 1.50,
            shared_cost: 0.00,
            bottle_part: "Bottle_03".into(),
            bottle_count: 1,
            accessories: Vec::new(),
            weight: 0.5,
            shares_with: Some(SharedBottle {
                partner: "general_chemistry".into(),
                reduced: true,
            }),
            requires_special_handling: false,
            special_warning: None,
        },
        Module {
            id: "nutrients".into(),
            name: "MODULE D: Nutrients".into(),
            description: "Ammonia, TKN, Nitrite, Phosphate".into(),
            tests: strings(&[
                "Ammonia (NH3)",
                "Total Kjeldahl Nitrogen (TKN)",
                "Nitrite (NO2-)",
                "Phosphate (PO4 3-)",
            ]),
            preservation: "H2SO4 to pH <2".into(),
            unit_cost: 4.00,
            shared_cost: 4.00,
            bottle_part: "Bottle_04".into(),
            bottle_count: 1,
            accessories: vec![ComponentLine::new("Pres_H2SO4", 1)],
            weight: 1.1,
            shares_with: None,
            requires_special_handling: false,
            special_warning: None,
        },
        Module {
            id: "pfas".into(),
            name: "MODULE P: PFAS (EPA 537.1 / 1633)".into(),
            description: "PFAS panels (3, 14, 18, 25, or 40-compound)".into(),
            tests: strings(&["PFAS-3", "PFAS-14", "PFAS-18", "PFAS-25", "PFAS-40"]),
            preservation: "NONE (but requires PFAS-free containers)".into(),
            unit_cost: 15.50,
            shared_cost: 15.50,
            bottle_part: "Bottle_05".into(),
            bottle_count: 2,
            accessories: vec![
                ComponentLine::new("Cap_PFAS", 2),
                ComponentLine::new("Label_PFAS", 2),
            ],
            weight: 1.2,
            shares_with: None,
            requires_special_handling: true,
            special_warning: Some(
                "PFAS KIT - Use ONLY PFAS-free materials! NO standard foam, NO fluorinated materials!"
                    .into(),
            ),
        },
        Module {
            id: "microbiology".into(),
            name: "MODULE M: Microbiology".into(),
            description: "Total Coliform, E. coli".into(),
            tests: strings(&["Total Coliform", "E. coli", "Fecal Coliform"]),
            preservation: "Sodium thiosulfate (for dechlorination)".into(),
            unit_cost: 2.50,
            shared_cost: 2.50,
            bottle_part: "Bottle_Sterile".into(),
            bottle_count: 1,
            accessories: vec![ComponentLine::new("Pres_Thio", 1)],
            weight: 0.3,
            shares_with: None,
            requires_special_handling: false,
            special_warning: None,
        },
    ]
}

fn bundles() -> Vec<Bundle> {
    vec![
        Bundle {
            sku: "KELP-DW-ESSENTIAL".into(),
            name: "Drinking Water Essentials".into(),
            description: "General chemistry, anions and metals".into(),
            modules: strings(&["general_chemistry", "anions", "metals"]),
            flat_price: 149.00,
        },
        Bundle {
            sku: "KELP-DW-COMPLETE".into(),
            name: "Drinking Water Complete".into(),
            description: "Essentials plus nutrients and microbiology".into(),
            modules: strings(&[
                "general_chemistry",
                "anions",
                "metals",
                "nutrients",
                "microbiology",
            ]),
            flat_price: 249.00,
        },
        Bundle {
            sku: "KELP-PFAS-SCREEN".into(),
            name: "PFAS Screening".into(),
            description: "PFAS panel with trace metals".into(),
            modules: strings(&["pfas", "metals"]),
            flat_price: 349.00,
        },
    ]
}

fn shipping_tiers() -> Vec<ShippingTier> {
    vec![
        ShippingTier {
            level: ServiceLevel::Standard,
            name: "Standard Shipping (Ground)".into(),
            description: "USPS/FedEx Ground".into(),
            base_rate: 8.00,
            transit_estimate: "3-5 business days".into(),
            weight_per_package: 0.0,
            components: Vec::new(),
        },
        ShippingTier {
            level: ServiceLevel::Compliance,
            name: "Compliance Shipping (Cooler + Ice)".into(),
            description: "For regulatory samples requiring temperature control".into(),
            base_rate: 50.00,
            transit_estimate: "2 business days".into(),
            weight_per_package: 4.0,
            components: vec![
                ComponentLine::new("Cool_12L", 1),
                ComponentLine::new("Ice_Gel", 4),
            ],
        },
    ]
}
