/*!
Named contact materials and the pairwise friction/restitution registry.

The registry is keyed by the unordered material pair and registration is
idempotent, so spawn code can re-register its pairs on every spawn and
repeats are a no-op.

The per-pair coefficients are applied through rapier's `PhysicsHooks`:
every collider carries its material tag in `user_data`, and
`modify_solver_contacts` rewrites the solver contacts for any pair the
registry knows about. Pairs the registry does not know keep rapier's
default combine rules.
*/

use std::collections::HashMap;

use rapier3d::prelude::{
    ActiveHooks, Collider, ContactModificationContext, PhysicsHooks,
};

/// Named body material, stored in collider `user_data`.
///
/// The numeric values are part of the collider tagging scheme; do not reuse
/// them for anything else.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Material {
    Sphere = 1,
    Blade = 2,
    Hub = 3,
    Boundary = 4,
    Floor = 5,
    Ceiling = 6,
}

impl Material {
    /// Decode a material tag from collider `user_data`. Returns `None` for
    /// untagged colliders or unknown tags.
    pub fn from_user_data(data: u128) -> Option<Self> {
        match data as u8 {
            1 => Some(Self::Sphere),
            2 => Some(Self::Blade),
            3 => Some(Self::Hub),
            4 => Some(Self::Boundary),
            5 => Some(Self::Floor),
            6 => Some(Self::Ceiling),
            _ => None,
        }
    }

    #[inline]
    pub fn user_data(self) -> u128 {
        self as u128
    }
}

/// Friction/restitution coefficients for one material pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactProps {
    pub friction: f32,
    pub restitution: f32,
}

impl ContactProps {
    #[inline]
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }
}

/// Unordered-pair lookup table for contact coefficients.
#[derive(Default)]
pub struct ContactMaterialRegistry {
    pairs: HashMap<(u8, u8), ContactProps>,
}

fn pair_key(a: Material, b: Material) -> (u8, u8) {
    let (a, b) = (a as u8, b as u8);
    if a <= b { (a, b) } else { (b, a) }
}

impl ContactMaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register coefficients for an unordered pair. Idempotent: the first
    /// registration wins and later ones are no-ops. Returns whether the pair
    /// was newly registered.
    pub fn register(&mut self, a: Material, b: Material, props: ContactProps) -> bool {
        let mut inserted = false;
        self.pairs.entry(pair_key(a, b)).or_insert_with(|| {
            inserted = true;
            props
        });
        inserted
    }

    pub fn lookup(&self, a: Material, b: Material) -> Option<ContactProps> {
        self.pairs.get(&pair_key(a, b)).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl PhysicsHooks for ContactMaterialRegistry {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let mat1 = Material::from_user_data(context.colliders[context.collider1].user_data);
        let mat2 = Material::from_user_data(context.colliders[context.collider2].user_data);
        let (Some(mat1), Some(mat2)) = (mat1, mat2) else {
            return;
        };
        let Some(props) = self.lookup(mat1, mat2) else {
            return;
        };
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = props.friction;
            contact.restitution = props.restitution;
        }
    }
}

/// Tag a collider with its material and enable the registry hook for it.
pub fn apply_material(collider: &mut Collider, material: Material) {
    collider.user_data = material.user_data();
    collider.set_active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent_and_order_insensitive() {
        let mut registry = ContactMaterialRegistry::new();
        assert!(registry.register(Material::Sphere, Material::Blade, ContactProps::new(0.0, 0.3)));
        // Same pair, other order, different props: ignored.
        assert!(!registry.register(Material::Blade, Material::Sphere, ContactProps::new(0.9, 0.9)));
        assert_eq!(registry.len(), 1);

        let props = registry.lookup(Material::Blade, Material::Sphere).unwrap();
        assert_eq!(props, ContactProps::new(0.0, 0.3));
    }

    #[test]
    fn lookup_misses_unregistered_pairs() {
        let mut registry = ContactMaterialRegistry::new();
        registry.register(Material::Sphere, Material::Boundary, ContactProps::new(0.0, 1.0));
        assert!(registry.lookup(Material::Sphere, Material::Floor).is_none());
    }

    #[test]
    fn material_tag_roundtrip() {
        for mat in [
            Material::Sphere,
            Material::Blade,
            Material::Hub,
            Material::Boundary,
            Material::Floor,
            Material::Ceiling,
        ] {
            assert_eq!(Material::from_user_data(mat.user_data()), Some(mat));
        }
        assert_eq!(Material::from_user_data(0), None);
        assert_eq!(Material::from_user_data(250), None);
    }
}
