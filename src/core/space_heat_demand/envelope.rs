use crate::core::material_properties::insulation_thermal_resistance;
use crate::core::units::CENTIMETRES_PER_METRE;
use crate::errors::ConfigurationError;
use crate::input::{
    check_insulation, AtticType, BasementType, BuildingAgeClass, BuildingInput, BuildingShape,
    EnvelopeAreas, EnvelopeComponent, Neighbours, OpaqueConstruction, WindowType,
};

/// Height of a story used for the heated air volume and the basement walls, in m.
///
/// The configured story height only scales the facade.
pub const NOMINAL_STORY_HEIGHT: f64 = 2.5;

/// Share of the floor area that is glazed
const WINDOW_TO_FLOOR_AREA_RATIO: f64 = 0.2;

/// Roof area of a pitched roof per m2 of ground area
const PITCHED_ROOF_AREA_FACTOR: f64 = 1.33;

const TIMBER_FRAME_U_VALUE_FACTOR: f64 = 0.8;

/// Labour and material cost of insulating one m2 of an opaque component
const INSULATION_BASE_COST: f64 = 60.; // Euro/m2
const INSULATION_COST_PER_CM: f64 = 3.; // Euro/(m2.cm)

/// Thermal transmittance of every envelope component, in W/(m2.K)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UValues {
    pub facade: f64,
    pub roof: f64,
    pub upper_ceiling: f64,
    pub groundplate: f64,
    pub window: f64,
}

impl UValues {
    pub fn get(&self, component: EnvelopeComponent) -> f64 {
        match component {
            EnvelopeComponent::Facade => self.facade,
            EnvelopeComponent::Roof => self.roof,
            EnvelopeComponent::UpperCeiling => self.upper_ceiling,
            EnvelopeComponent::Groundplate => self.groundplate,
            EnvelopeComponent::Window => self.window,
        }
    }

    fn get_mut(&mut self, component: EnvelopeComponent) -> &mut f64 {
        match component {
            EnvelopeComponent::Facade => &mut self.facade,
            EnvelopeComponent::Roof => &mut self.roof,
            EnvelopeComponent::UpperCeiling => &mut self.upper_ceiling,
            EnvelopeComponent::Groundplate => &mut self.groundplate,
            EnvelopeComponent::Window => &mut self.window,
        }
    }
}

fn perimeter_factor(shape: BuildingShape) -> f64 {
    match shape {
        BuildingShape::Compact => 4.0,
        BuildingShape::Elongated => 4.24,
        BuildingShape::Complex => 4.8,
    }
}

fn exposed_facade_fraction(neighbours: Neighbours) -> f64 {
    match neighbours {
        Neighbours::None => 1.0,
        Neighbours::OneSide => 0.75,
        Neighbours::TwoSides => 0.5,
    }
}

/// Share of the ground-facing heat loss that goes through the heated envelope.
pub(crate) fn basement_heating_factor(basement: BasementType) -> f64 {
    match basement {
        BasementType::None | BasementType::Heated => 1.0,
        BasementType::PartlyHeated => 0.5,
        BasementType::Unheated => 0.,
    }
}

/// Share of the upper heat loss that goes through the roof rather than the upper ceiling.
pub(crate) fn attic_heating_factor(attic: AtticType) -> f64 {
    match attic {
        AtticType::FlatRoof | AtticType::Heated => 1.0,
        AtticType::PartlyHeated => 0.5,
        AtticType::Unheated => 0.,
    }
}

/// Temperature of unheated spaces (attic, basement) next to the heated volume, in deg C
pub(crate) fn adjacent_space_temperature(age_class: BuildingAgeClass) -> f64 {
    match age_class {
        BuildingAgeClass::Before1919 | BuildingAgeClass::From1919To1948 => 12.,
        BuildingAgeClass::From1949To1978 => 13.,
        BuildingAgeClass::From1979To1994 => 14.,
        BuildingAgeClass::From1995To2009 => 15.,
        BuildingAgeClass::From2010 => 16.,
    }
}

/// Typical U-values of massive constructions of each era
fn default_u_values(age_class: BuildingAgeClass) -> UValues {
    let (facade, roof, upper_ceiling, groundplate, window) = match age_class {
        BuildingAgeClass::Before1919 => (1.7, 1.4, 1.0, 1.2, 2.8),
        BuildingAgeClass::From1919To1948 => (1.5, 1.4, 0.9, 1.2, 2.8),
        BuildingAgeClass::From1949To1978 => (1.2, 0.9, 0.8, 1.0, 2.7),
        BuildingAgeClass::From1979To1994 => (0.6, 0.5, 0.5, 0.7, 2.7),
        BuildingAgeClass::From1995To2009 => (0.35, 0.25, 0.25, 0.4, 1.5),
        BuildingAgeClass::From2010 => (0.25, 0.18, 0.18, 0.3, 1.1),
    };
    UValues {
        facade,
        roof,
        upper_ceiling,
        groundplate,
        window,
    }
}

fn default_window_type(age_class: BuildingAgeClass) -> WindowType {
    match age_class {
        BuildingAgeClass::Before1919
        | BuildingAgeClass::From1919To1948
        | BuildingAgeClass::From1949To1978
        | BuildingAgeClass::From1979To1994 => WindowType::WoodDoubleGlazed,
        BuildingAgeClass::From1995To2009 => WindowType::PlasticInsulatingGlass,
        BuildingAgeClass::From2010 => WindowType::TripleGlazed,
    }
}

fn construction_u_value_factor(construction: OpaqueConstruction) -> f64 {
    match construction {
        OpaqueConstruction::Massive => 1.0,
        OpaqueConstruction::TimberFrame => TIMBER_FRAME_U_VALUE_FACTOR,
    }
}

pub(crate) fn window_u_value(window_type: WindowType) -> f64 {
    match window_type {
        WindowType::WoodSingleGlazed => 5.0,
        WindowType::WoodDoubleGlazed => 2.7,
        WindowType::PlasticInsulatingGlass => 1.3,
        WindowType::AluSteelInsulatingGlass => 1.9,
        WindowType::TripleGlazed => 0.8,
    }
}

pub(crate) fn window_g_value(window_type: WindowType) -> f64 {
    match window_type {
        WindowType::WoodSingleGlazed => 0.87,
        WindowType::WoodDoubleGlazed => 0.75,
        WindowType::PlasticInsulatingGlass | WindowType::AluSteelInsulatingGlass => 0.6,
        WindowType::TripleGlazed => 0.5,
    }
}

/// Replacement price of windows of this type, in Euro/m2
pub(crate) fn window_price(window_type: WindowType) -> f64 {
    match window_type {
        WindowType::WoodSingleGlazed | WindowType::WoodDoubleGlazed => 500.,
        WindowType::PlasticInsulatingGlass => 400.,
        WindowType::AluSteelInsulatingGlass => 700.,
        WindowType::TripleGlazed => 650.,
    }
}

/// Thermal envelope of the single heated zone of the household.
///
/// The geometry and classification fields are fixed for the life of the building. Renovation
/// only ever changes U-values, the window type and g-value, never the areas.
#[derive(Clone, Debug)]
pub struct BuildingEnvelope {
    ground_area: f64,
    stories: u32,
    story_height: f64,
    shape: BuildingShape,
    neighbours: Neighbours,
    basement: BasementType,
    attic: AtticType,
    age_class: BuildingAgeClass,
    window_type: WindowType,
    u_values: UValues,
    g_value_window: f64,
    shading: f64,
    pub ventilation_rate: f64,  // 1/h
    pub infiltration_rate: f64, // 1/h
    orientation_offset: f64,
    areas: EnvelopeAreas,
}

impl BuildingEnvelope {
    pub fn from_input(input: &BuildingInput) -> Result<Self, ConfigurationError> {
        let constructions = &input.constructions;
        let defaults = default_u_values(input.age_class);
        let window_type = constructions
            .window
            .unwrap_or_else(|| default_window_type(input.age_class));

        let u_values = UValues {
            facade: input.u_values.facade.unwrap_or(
                defaults.facade * construction_u_value_factor(constructions.facade),
            ),
            roof: input
                .u_values
                .roof
                .unwrap_or(defaults.roof * construction_u_value_factor(constructions.roof)),
            upper_ceiling: input.u_values.upper_ceiling.unwrap_or(
                defaults.upper_ceiling * construction_u_value_factor(constructions.upper_ceiling),
            ),
            groundplate: input.u_values.groundplate.unwrap_or(
                defaults.groundplate * construction_u_value_factor(constructions.groundplate),
            ),
            window: input.u_values.window.unwrap_or(match constructions.window {
                Some(window_type) => window_u_value(window_type),
                None => defaults.window,
            }),
        };

        let mut envelope = Self {
            ground_area: input.ground_area,
            stories: input.stories,
            story_height: input.story_height,
            shape: input.shape,
            neighbours: input.neighbours,
            basement: input.basement,
            attic: input.attic,
            age_class: input.age_class,
            window_type,
            u_values,
            g_value_window: input
                .g_value_window
                .unwrap_or_else(|| window_g_value(window_type)),
            shading: input.shading,
            ventilation_rate: input.ventilation_rate,
            infiltration_rate: input.infiltration_rate,
            orientation_offset: input.orientation_offset,
            areas: Default::default(),
        };
        envelope.areas = match input.areas {
            Some(areas) => areas,
            None => envelope.estimate_areas(),
        };

        if envelope.areas.facade + envelope.areas.window <= 0. {
            return Err(ConfigurationError::invalid_value(
                "areas",
                "the building has no facade or window area",
            ));
        }

        Ok(envelope)
    }

    /// Estimate the envelope areas from the ground area, the number of stories and the
    /// building classification.
    fn estimate_areas(&self) -> EnvelopeAreas {
        let floor_area = self.floor_area();
        let perimeter = perimeter_factor(self.shape) * self.ground_area.sqrt();
        let window = WINDOW_TO_FLOOR_AREA_RATIO * floor_area;
        let facade = (perimeter
            * self.story_height
            * self.stories as f64
            * exposed_facade_fraction(self.neighbours)
            - window)
            .max(0.);

        let (roof, upper_ceiling) = match self.attic {
            AtticType::FlatRoof => (self.ground_area, 0.),
            AtticType::Heated | AtticType::PartlyHeated | AtticType::Unheated => {
                (PITCHED_ROOF_AREA_FACTOR * self.ground_area, self.ground_area)
            }
        };
        let basement_wall = match self.basement {
            BasementType::None => 0.,
            BasementType::Heated | BasementType::PartlyHeated | BasementType::Unheated => {
                perimeter * NOMINAL_STORY_HEIGHT
            }
        };

        EnvelopeAreas {
            facade,
            roof,
            upper_ceiling,
            ground: self.ground_area,
            window,
            basement_wall,
        }
    }

    pub fn floor_area(&self) -> f64 {
        self.ground_area * self.stories as f64
    }

    pub fn volume_air(&self) -> f64 {
        self.floor_area() * NOMINAL_STORY_HEIGHT
    }

    pub fn areas(&self) -> &EnvelopeAreas {
        &self.areas
    }

    pub fn u_values(&self) -> &UValues {
        &self.u_values
    }

    pub fn g_value_window(&self) -> f64 {
        self.g_value_window
    }

    pub fn shading(&self) -> f64 {
        self.shading
    }

    pub fn orientation_offset(&self) -> f64 {
        self.orientation_offset
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn basement(&self) -> BasementType {
        self.basement
    }

    pub fn attic(&self) -> AtticType {
        self.attic
    }

    pub fn age_class(&self) -> BuildingAgeClass {
        self.age_class
    }

    /// Area of an envelope component, in m2. Roof and upper ceiling renovation both act on the
    /// upper boundary of the heated zone.
    pub fn component_area(&self, component: EnvelopeComponent) -> f64 {
        match component {
            EnvelopeComponent::Facade => self.areas.facade,
            EnvelopeComponent::Roof => self.areas.roof,
            EnvelopeComponent::UpperCeiling => self.areas.upper_ceiling,
            EnvelopeComponent::Groundplate => self.areas.ground,
            EnvelopeComponent::Window => self.areas.window,
        }
    }

    /// Cost of adding an insulation layer to an opaque component, in Euro.
    ///
    /// Arguments:
    /// * `component` - the opaque component to insulate
    /// * `thickness_cm` - thickness of the added insulation, in cm
    pub fn insulation_cost(&self, component: EnvelopeComponent, thickness_cm: f64) -> f64 {
        self.component_area(component)
            * (INSULATION_BASE_COST + INSULATION_COST_PER_CM * thickness_cm)
    }

    /// Add an insulation layer to an opaque component and return the new U-value.
    ///
    /// The layer's resistance is added in series to the existing construction:
    /// U' = 1 / (1/U + d/lambda).
    pub fn insulate(
        &mut self,
        component: EnvelopeComponent,
        thickness_cm: f64,
    ) -> Result<f64, ConfigurationError> {
        check_insulation(component, thickness_cm)?;

        let thickness = thickness_cm / CENTIMETRES_PER_METRE as f64;
        let u_value = self.u_values.get_mut(component);
        *u_value = 1. / (1. / *u_value + insulation_thermal_resistance(thickness));

        Ok(*u_value)
    }

    /// Cost of replacing all windows with the given type, in Euro
    pub fn window_replacement_cost(&self, window_type: WindowType) -> f64 {
        self.areas.window * window_price(window_type)
    }

    /// Replace all windows. Both the U-value and the g-value follow the new window type.
    pub fn change_windows(&mut self, window_type: WindowType) {
        self.window_type = window_type;
        self.u_values.window = window_u_value(window_type);
        self.g_value_window = window_g_value(window_type);
    }
}
