//! Terminal geometry table.
//!
//! Maps every [`ComponentType`] to its named connection terminals, given as
//! offsets from the component centre in local (unrotated, unscaled) space.
//! The table is a closed enum match, so adding a component type without
//! terminals is a compile error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named terminal offset in local component space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalOffset {
    pub id: &'static str,
    pub x: f64,
    pub y: f64,
}

const fn t(id: &'static str, x: f64, y: f64) -> TerminalOffset {
    TerminalOffset { id, x, y }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared terminal shapes
// ────────────────────────────────────────────────────────────────────────────

const TWO_PIN: &[TerminalOffset] = &[t("left", -24.0, 0.0), t("right", 24.0, 0.0)];
const DIODE: &[TerminalOffset] = &[t("anode", -24.0, 0.0), t("cathode", 24.0, 0.0)];
const SOURCE: &[TerminalOffset] = &[t("positive", 24.0, 0.0), t("negative", -24.0, 0.0)];
const IN_OUT: &[TerminalOffset] = &[t("input", -24.0, 0.0), t("output", 24.0, 0.0)];
const GROUND: &[TerminalOffset] = &[t("input", 0.0, -10.0)];
const NODE: &[TerminalOffset] = &[t("center", 0.0, 0.0)];
const ANTENNA: &[TerminalOffset] = &[t("input", 0.0, 0.0)];
const SINK: &[TerminalOffset] = &[t("input", -24.0, 0.0)];
const SOURCE_ONLY: &[TerminalOffset] = &[t("output", 24.0, 0.0)];

const OP_AMP: &[TerminalOffset] = &[
    t("output", 28.0, 0.0),
    t("inverting", -26.0, -6.0),
    t("nonInverting", -26.0, 6.0),
];
const AMPLIFIER: &[TerminalOffset] = &[
    t("output", 28.0, 0.0),
    t("input+", -26.0, -6.0),
    t("input-", -26.0, 6.0),
];

const BJT: &[TerminalOffset] = &[
    t("collector", 24.0, 0.0),
    t("base", -24.0, -4.0),
    t("emitter", -24.0, 4.0),
];
const DARLINGTON: &[TerminalOffset] = &[
    t("collector", 24.0, 0.0),
    t("base", -24.0, -2.0),
    t("emitter", -24.0, 2.0),
];
const FET: &[TerminalOffset] = &[
    t("drain", 24.0, 0.0),
    t("gate", 0.0, -16.0),
    t("source", -24.0, 0.0),
];
const IGBT: &[TerminalOffset] = &[
    t("collector", 24.0, 0.0),
    t("gate", 0.0, -16.0),
    t("emitter", -24.0, 0.0),
];

const THYRISTOR: &[TerminalOffset] = &[
    t("anode", 24.0, 0.0),
    t("cathode", -24.0, 0.0),
    t("gate", 0.0, -16.0),
];
const TRIAC: &[TerminalOffset] = &[
    t("anode1", 24.0, 0.0),
    t("anode2", -24.0, 0.0),
    t("gate", 0.0, -16.0),
];
const DIAC: &[TerminalOffset] = &[t("anode1", 24.0, 0.0), t("anode2", -24.0, 0.0)];

const TRANSFORMER: &[TerminalOffset] = &[
    t("primary1", -24.0, -8.0),
    t("primary2", -24.0, 8.0),
    t("secondary1", 16.0, -8.0),
    t("secondary2", 16.0, 8.0),
];
const RELAY: &[TerminalOffset] = &[
    t("input1", -24.0, -4.0),
    t("input2", -24.0, 4.0),
    t("output1", 24.0, -4.0),
    t("output2", 24.0, 4.0),
];
const POTENTIOMETER: &[TerminalOffset] = &[
    t("left", -24.0, 0.0),
    t("right", 24.0, 0.0),
    t("wiper", 0.0, -8.0),
];
const CONTROLLED_SOURCE: &[TerminalOffset] = &[
    t("output+", 24.0, 0.0),
    t("output-", -24.0, 0.0),
    t("input+", -24.0, -16.0),
    t("input-", -24.0, -20.0),
];

const TWO_IN_ONE_OUT: &[TerminalOffset] = &[
    t("input1", -24.0, -8.0),
    t("input2", -24.0, 8.0),
    t("output", 24.0, 0.0),
];
const ONE_IN_TWO_OUT: &[TerminalOffset] = &[
    t("input", -24.0, 0.0),
    t("output1", 24.0, -8.0),
    t("output2", 24.0, 8.0),
];
const FOUR_PIN: &[TerminalOffset] = &[
    t("input1", -24.0, -8.0),
    t("input2", -24.0, 8.0),
    t("output1", 24.0, -8.0),
    t("output2", 24.0, 8.0),
];

// ────────────────────────────────────────────────────────────────────────────
// Component types
// ────────────────────────────────────────────────────────────────────────────

macro_rules! component_types {
    ($($variant:ident => $name:literal : $shape:expr),* $(,)?) => {
        /// Every placeable component symbol.
        ///
        /// Serialized by its display name (`"Resistor"`, `"TransistorNPN"`, ...).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ComponentType {
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl ComponentType {
            /// All component types in catalog order.
            pub const ALL: &'static [ComponentType] = &[$(ComponentType::$variant),*];

            /// Display / serialized name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ComponentType::$variant => $name,)*
                }
            }

            /// Terminal offsets in local space, in table order.
            pub fn terminals(self) -> &'static [TerminalOffset] {
                match self {
                    $(ComponentType::$variant => $shape,)*
                }
            }
        }
    };
}

component_types! {
    Resistor => "Resistor": TWO_PIN,
    Capacitor => "Capacitor": TWO_PIN,
    Inductor => "Inductor": TWO_PIN,
    Battery => "Battery": SOURCE,
    Ground => "Ground": GROUND,
    OpAmp => "OpAmp": OP_AMP,
    Diode => "Diode": DIODE,
    Led => "LED": DIODE,
    Switch => "Switch": IN_OUT,
    Node => "Node": NODE,

    TransistorNpn => "TransistorNPN": BJT,
    TransistorPnp => "TransistorPNP": BJT,
    MosfetN => "MOSFETN": FET,
    MosfetP => "MOSFETP": FET,
    JfetN => "JFETN": FET,
    JfetP => "JFETP": FET,
    Igbt => "IGBT": IGBT,
    DarlingtonTransistor => "DarlingtonTransistor": DARLINGTON,

    ZenerDiode => "ZenerDiode": DIODE,
    SchottkyDiode => "SchottkyDiode": DIODE,
    VaractorDiode => "VaractorDiode": DIODE,
    Photodiode => "Photodiode": DIODE,
    TunnelDiode => "TunnelDiode": DIODE,
    AvalancheDiode => "AvalancheDiode": DIODE,

    Thyristor => "Thyristor": THYRISTOR,
    Triac => "Triac": TRIAC,
    Diac => "Diac": DIAC,
    PowerMosfet => "PowerMOSFET": FET,

    Transformer => "Transformer": TRANSFORMER,
    Crystal => "Crystal": TWO_PIN,
    Relay => "Relay": RELAY,
    Fuse => "Fuse": TWO_PIN,
    Potentiometer => "Potentiometer": POTENTIOMETER,
    VariableCapacitor => "VariableCapacitor": TWO_PIN,
    VariableInductor => "VariableInductor": TWO_PIN,
    Thermistor => "Thermistor": TWO_PIN,
    Photoresistor => "Photoresistor": TWO_PIN,
    Varistor => "Varistor": TWO_PIN,

    VoltageSource => "VoltageSource": SOURCE,
    CurrentSource => "CurrentSource": SOURCE,
    AcSource => "ACSource": SOURCE,
    DcSource => "DCSource": SOURCE,
    VoltageControlledVoltageSource => "VoltageControlledVoltageSource": CONTROLLED_SOURCE,
    CurrentControlledCurrentSource => "CurrentControlledCurrentSource": CONTROLLED_SOURCE,
    VoltageControlledCurrentSource => "VoltageControlledCurrentSource": CONTROLLED_SOURCE,
    CurrentControlledVoltageSource => "CurrentControlledVoltageSource": CONTROLLED_SOURCE,

    Amplifier => "Amplifier": AMPLIFIER,
    DifferentialAmplifier => "DifferentialAmplifier": AMPLIFIER,
    InstrumentationAmplifier => "InstrumentationAmplifier": AMPLIFIER,
    Comparator => "Comparator": AMPLIFIER,
    SchmittTrigger => "SchmittTrigger": AMPLIFIER,

    LogicGateAnd => "LogicGateAND": TWO_IN_ONE_OUT,
    LogicGateOr => "LogicGateOR": TWO_IN_ONE_OUT,
    LogicGateNot => "LogicGateNOT": IN_OUT,
    LogicGateNand => "LogicGateNAND": TWO_IN_ONE_OUT,
    LogicGateNor => "LogicGateNOR": TWO_IN_ONE_OUT,
    LogicGateXor => "LogicGateXOR": TWO_IN_ONE_OUT,
    LogicGateXnor => "LogicGateXNOR": TWO_IN_ONE_OUT,
    Buffer => "Buffer": IN_OUT,
    Inverter => "Inverter": IN_OUT,

    FlipFlop => "FlipFlop": FOUR_PIN,
    Counter => "Counter": IN_OUT,
    Decoder => "Decoder": FOUR_PIN,
    Encoder => "Encoder": FOUR_PIN,
    Multiplexer => "Multiplexer": TWO_IN_ONE_OUT,
    Demultiplexer => "Demultiplexer": ONE_IN_TWO_OUT,
    Adder => "Adder": TWO_IN_ONE_OUT,
    Subtractor => "Subtractor": TWO_IN_ONE_OUT,
    Latch => "Latch": FOUR_PIN,
    Register => "Register": FOUR_PIN,
    Memory => "Memory": FOUR_PIN,
    Cpu => "CPU": FOUR_PIN,
    Microcontroller => "Microcontroller": FOUR_PIN,
    Dsp => "DSP": FOUR_PIN,
    Fpga => "FPGA": FOUR_PIN,
    Adc => "ADC": IN_OUT,
    Dac => "DAC": IN_OUT,

    Pll => "PLL": IN_OUT,
    Vco => "VCO": IN_OUT,
    Mixer => "Mixer": TWO_IN_ONE_OUT,
    Oscillator => "Oscillator": SOURCE_ONLY,
    Filter => "Filter": IN_OUT,
    Antenna => "Antenna": ANTENNA,
    AmplifierRf => "AmplifierRF": IN_OUT,
    AttenuatorRf => "AttenuatorRF": IN_OUT,
    FilterRf => "FilterRF": IN_OUT,
    Coupler => "Coupler": IN_OUT,
    PowerDivider => "PowerDivider": ONE_IN_TWO_OUT,
    PhaseShifter => "PhaseShifter": IN_OUT,
    SwitchRf => "SwitchRF": IN_OUT,
    Limiter => "Limiter": IN_OUT,
    Detector => "Detector": IN_OUT,
    Modulator => "Modulator": TWO_IN_ONE_OUT,
    Demodulator => "Demodulator": ONE_IN_TWO_OUT,
    Receiver => "Receiver": IN_OUT,
    Transmitter => "Transmitter": IN_OUT,
    Transceiver => "Transceiver": IN_OUT,
    Duplexer => "Duplexer": IN_OUT,
    Diplexer => "Diplexer": ONE_IN_TWO_OUT,
    Balun => "Balun": IN_OUT,
    TransformerRf => "TransformerRF": IN_OUT,
    Resonator => "Resonator": IN_OUT,
    Cavity => "Cavity": IN_OUT,
    Waveguide => "Waveguide": IN_OUT,
    Coaxial => "Coaxial": IN_OUT,
    Stripline => "Stripline": IN_OUT,
    Microstrip => "Microstrip": IN_OUT,
    Coplanar => "Coplanar": IN_OUT,
    Slotline => "Slotline": IN_OUT,

    Speaker => "Speaker": SINK,
    Microphone => "Microphone": SOURCE_ONLY,
    Motor => "Motor": FOUR_PIN,
    Generator => "Generator": FOUR_PIN,
}

impl ComponentType {
    /// Look up a single terminal offset by id.
    pub fn terminal(self, id: &str) -> Option<&'static TerminalOffset> {
        self.terminals().iter().find(|t| t.id == id)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown component type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown component type: {0}")]
pub struct UnknownComponentType(pub String);

impl FromStr for ComponentType {
    type Err = UnknownComponentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownComponentType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_type_has_terminals() {
        for ty in ComponentType::ALL {
            assert!(!ty.terminals().is_empty(), "{ty} has no terminals");
        }
    }

    #[test]
    fn test_terminal_ids_unique_per_type() {
        for ty in ComponentType::ALL {
            let ids: HashSet<_> = ty.terminals().iter().map(|t| t.id).collect();
            assert_eq!(ids.len(), ty.terminals().len(), "{ty} repeats a terminal id");
        }
    }

    #[test]
    fn test_names_round_trip() {
        for ty in ComponentType::ALL {
            assert_eq!(ty.as_str().parse::<ComponentType>().unwrap(), *ty);
        }
        assert!("Flux Capacitor".parse::<ComponentType>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&ComponentType::TransistorNpn).unwrap();
        assert_eq!(json, "\"TransistorNPN\"");
        let ty: ComponentType = serde_json::from_str("\"LED\"").unwrap();
        assert_eq!(ty, ComponentType::Led);
    }

    #[test]
    fn test_known_offsets() {
        let r = ComponentType::Resistor;
        assert_eq!(r.terminal("right").map(|t| (t.x, t.y)), Some((24.0, 0.0)));
        let g = ComponentType::Ground;
        assert_eq!(g.terminals(), &[t("input", 0.0, -10.0)]);
        let op = ComponentType::OpAmp;
        assert_eq!(op.terminal("nonInverting").map(|t| (t.x, t.y)), Some((-26.0, 6.0)));
        assert_eq!(ComponentType::Transformer.terminals().len(), 4);
    }
}
