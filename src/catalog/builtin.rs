//! Built-in ghost catalog.

use crate::behavior::SpeedKind::{Fast, Normal, Slow};
use crate::behavior::TraitKind::{HuntEarly, HuntLate, Shy};
use crate::behavior::VisibilityKind;
use crate::evidence::EvidenceKind::{
    DotsProjector as Dots, EmfLevel5 as Emf, Fingerprints as Prints, FreezingTemps as Freezing,
    GhostOrbs as Orbs, GhostWriting as Writing, SpiritBox as Sbox,
};

use super::ghost::Ghost;

pub(super) fn ghosts() -> Vec<Ghost> {
    vec![
        Ghost::new("Spirit", &[Emf, Sbox, Writing])
            .rhythm((60, 80), (100, 170))
            .hunts_at(50, "Default")
            .smudge(180),
        Ghost::new("Wraith", &[Emf, Sbox, Dots])
            .speeds(&[Fast])
            .rhythm((75, 90), (100, 170))
            .hunts_at(50, "Default"),
        Ghost::new("Phantom", &[Sbox, Prints, Dots])
            .visibilities(&[VisibilityKind::Invisible])
            .rhythm((65, 75), (100, 170))
            .hunts_at(50, "Default"),
        Ghost::new("Poltergeist", &[Sbox, Prints, Writing])
            .speeds(&[Fast])
            .rhythm((80, 100), (100, 170))
            .hunts_at(50, "Default"),
        Ghost::new("Banshee", &[Prints, Orbs, Dots])
            .traits(&[HuntEarly])
            .rhythm((50, 65), (100, 170))
            .hunts_at(50, "Target's sanity only"),
        Ghost::new("Jinn", &[Emf, Prints, Freezing])
            .speeds(&[Normal, Fast])
            .rhythm((85, 105), (100, 250))
            .hunts_at(50, "Default"),
        Ghost::new("Mare", &[Sbox, Orbs, Writing])
            .traits(&[HuntEarly])
            .rhythm((70, 85), (100, 170))
            .hunts_at(60, "Lights off")
            .hunts_at(40, "Lights on"),
        Ghost::new("Revenant", &[Orbs, Writing, Freezing])
            .speeds(&[Slow, Fast])
            .rhythm((40, 60), (50, 300))
            .hunts_at(50, "Default"),
        Ghost::new("Shade", &[Emf, Writing, Freezing])
            .traits(&[Shy, HuntLate])
            .rhythm((55, 70), (100, 170))
            .hunts_at(35, "Default"),
        Ghost::new("Demon", &[Prints, Writing, Freezing])
            .traits(&[HuntEarly])
            .rhythm((90, 110), (100, 170))
            .hunts_at(70, "Default")
            .hunts_at(100, "Ability")
            .smudge(60),
        Ghost::new("Yurei", &[Orbs, Freezing, Dots])
            .rhythm((65, 80), (100, 170))
            .hunts_at(50, "Default"),
        Ghost::new("Oni", &[Emf, Freezing, Dots])
            .speeds(&[Fast])
            .visibilities(&[VisibilityKind::Visible])
            .rhythm((95, 115), (100, 170))
            .hunts_at(50, "Default"),
        Ghost::new("Yokai", &[Sbox, Orbs, Dots])
            .traits(&[HuntEarly])
            .rhythm((75, 90), (100, 170))
            .hunts_at(80, "Talking nearby")
            .hunts_at(50, "Default"),
        Ghost::new("Hantu", &[Prints, Orbs, Freezing])
            .guaranteed(&[Freezing])
            .speeds(&[Slow, Fast])
            .rhythm((60, 90), (100, 270))
            .hunts_at(50, "Default"),
        Ghost::new("Goryo", &[Emf, Prints, Dots])
            .guaranteed(&[Dots])
            .traits(&[Shy])
            .rhythm((70, 85), (100, 170))
            .hunts_at(50, "Default"),
        Ghost::new("Myling", &[Emf, Prints, Writing])
            .rhythm((55, 75), (100, 170))
            .hunts_at(50, "Default"),
        Ghost::new("Onryo", &[Sbox, Orbs, Freezing])
            .traits(&[HuntEarly])
            .rhythm((80, 95), (100, 170))
            .hunts_at(60, "Default")
            .hunts_at(100, "Third flame extinguished"),
        Ghost::new("The Twins", &[Emf, Sbox, Freezing])
            .speeds(&[Slow, Fast])
            .rhythm((50, 100), (100, 190))
            .hunts_at(50, "Default"),
        Ghost::new("Raiju", &[Emf, Orbs, Dots])
            .traits(&[HuntEarly])
            .speeds(&[Fast])
            .rhythm((100, 120), (100, 250))
            .hunts_at(65, "Near active electronics")
            .hunts_at(50, "Default"),
        Ghost::new("Obake", &[Emf, Prints, Orbs])
            .guaranteed(&[Prints])
            .rhythm((65, 80), (100, 170))
            .hunts_at(50, "Default"),
        Ghost::new("The Mimic", &[Sbox, Prints, Freezing])
            .bonus(Orbs)
            .traits(&[Shy])
            .speeds(&[Slow, Normal, Fast])
            .visibilities(&[
                VisibilityKind::Visible,
                VisibilityKind::Invisible,
                VisibilityKind::Normal,
            ])
            .rhythm((40, 120), (50, 300))
            .hunts_at(50, "Mimicked ghost's threshold"),
        Ghost::new("Moroi", &[Sbox, Writing, Freezing])
            .guaranteed(&[Sbox])
            .speeds(&[Fast])
            .rhythm((85, 105), (100, 220))
            .hunts_at(50, "Default"),
        Ghost::new("Deogen", &[Sbox, Writing, Dots])
            .guaranteed(&[Sbox])
            .speeds(&[Slow, Fast])
            .rhythm((45, 75), (40, 300))
            .hunts_at(40, "Default"),
        Ghost::new("Thaye", &[Orbs, Writing, Dots])
            .traits(&[HuntEarly, HuntLate])
            .speeds(&[Slow, Fast])
            .rhythm((50, 110), (60, 200))
            .hunts_at(75, "Young")
            .hunts_at(15, "Old"),
    ]
}
