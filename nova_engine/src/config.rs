//! Path: nova_engine/src/config.rs
//! Summary: セッション設定（ウェーブスケジュール・ボスフェーズ・パワーアップ表）の読込と検証
//!
//! 設定はセッション開始時に一度だけ読み込まれ、以後 immutable。検証に
//! 失敗した設定ではセッションを開始できない（fatal）。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use nova_core::constants::{MAX_ENTITIES, PLAYFIELD_BOTTOM, PLAYFIELD_TOP, SCREEN_HEIGHT};
use nova_core::params::{
    BossAttack, BossMotion, EnemyKind, FormationPattern, PowerupKind, StackPolicy,
    ALL_POWERUP_KINDS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse session config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("schedule entry {index}: timed triggers must be non-decreasing")]
    UnsortedSchedule { index: usize },
    #[error("schedule entry {index}: formation count must be non-zero")]
    EmptyFormation { index: usize },
    #[error("schedule entry {index}: stagger interval must be non-negative")]
    NegativeStagger { index: usize },
    #[error("boss must define at least one phase")]
    NoBossPhases,
    #[error("first boss phase must start at full health (enter_below = 1.0)")]
    FirstPhaseNotFull,
    #[error("boss phase {index}: thresholds must strictly descend")]
    PhaseOrder { index: usize },
    #[error("powerup {kind:?}: duration must be positive")]
    BadDuration { kind: PowerupKind },
    #[error("powerup {kind:?}: stack cap must be non-zero")]
    ZeroCap { kind: PowerupKind },
    #[error("duplicate powerup policy for {kind:?}")]
    DuplicatePolicy { kind: PowerupKind },
    #[error("entity cap must be at least 2")]
    TinyEntityCap,
}

/// 1 スポーンイベントの隊形記述。SpawnDirector が発行したら以後 immutable。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormationSpec {
    pub kind:    EnemyKind,
    pub pattern: FormationPattern,
    pub count:   usize,
    /// 隊列の間隔（px）
    pub spacing: f32,
    /// 基準進入 Y 座標
    pub entry_y: f32,
    /// 隊列 1 機ごとの出現遅延（秒）。隊全体が一瞬で湧かないための値。
    pub stagger: f32,
}

/// スケジュールエントリのトリガ
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveTrigger {
    /// セッション経過時間がこの秒数に達したら
    AtTime(f32),
    /// 先行ウェーブの敵が全滅し、出現待ちも残っていなければ
    WaveCleared,
}

/// スケジュールエントリの内容
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    Formation(FormationSpec),
    Boss,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub trigger: WaveTrigger,
    pub spawn:   SpawnKind,
}

/// ボスフェーズ定義。enter_below は HP 割合（phase 0 は 1.0 固定）。
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BossPhaseSpec {
    pub enter_below:     f32,
    pub attack:          BossAttack,
    pub motion:          BossMotion,
    pub attack_interval: f32,
    /// フェーズ突入直後の無敵時間（秒）
    pub entry_invuln:    f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BossSpec {
    pub max_hp:         i32,
    pub radius:         f32,
    pub contact_damage: i32,
    pub shot_damage:    i32,
    pub score:          u32,
    pub phases:         Vec<BossPhaseSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PowerupPolicyEntry {
    pub kind:   PowerupKind,
    #[serde(flatten)]
    pub policy: StackPolicy,
}

/// セッション設定。schedule の順序がそのままシーケンス順になる。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub seed:       u64,
    #[serde(default = "default_entity_cap")]
    pub entity_cap: usize,
    pub schedule:   Vec<ScheduleEntry>,
    pub boss:       BossSpec,
    /// 省略された kind はデフォルトポリシーを使う
    #[serde(default)]
    pub powerups:   Vec<PowerupPolicyEntry>,
    /// スケジュール外の難易度連動スポーン（補充敵 + 定期パワーアップ）
    #[serde(default)]
    pub filler_spawns: bool,
}

fn default_entity_cap() -> usize {
    MAX_ENTITIES
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// サバイバルセッションの既定設定
    pub fn default_survival(seed: u64) -> Self {
        let mid = SCREEN_HEIGHT / 2.0;
        Self {
            seed,
            entity_cap: MAX_ENTITIES,
            schedule: vec![
                ScheduleEntry {
                    trigger: WaveTrigger::AtTime(2.0),
                    spawn: SpawnKind::Formation(FormationSpec {
                        kind: EnemyKind::Grunt,
                        pattern: FormationPattern::Line,
                        count: 4,
                        spacing: 70.0,
                        entry_y: PLAYFIELD_TOP + 60.0,
                        stagger: 0.25,
                    }),
                },
                ScheduleEntry {
                    trigger: WaveTrigger::AtTime(12.0),
                    spawn: SpawnKind::Formation(FormationSpec {
                        kind: EnemyKind::Gunner,
                        pattern: FormationPattern::Vee,
                        count: 5,
                        spacing: 50.0,
                        entry_y: mid,
                        stagger: 0.2,
                    }),
                },
                ScheduleEntry {
                    trigger: WaveTrigger::AtTime(25.0),
                    spawn: SpawnKind::Formation(FormationSpec {
                        kind: EnemyKind::Weaver,
                        pattern: FormationPattern::Column,
                        count: 4,
                        spacing: 80.0,
                        entry_y: mid - 100.0,
                        stagger: 0.3,
                    }),
                },
                ScheduleEntry {
                    trigger: WaveTrigger::AtTime(40.0),
                    spawn: SpawnKind::Formation(FormationSpec {
                        kind: EnemyKind::Bulwark,
                        pattern: FormationPattern::Diagonal,
                        count: 3,
                        spacing: 90.0,
                        entry_y: PLAYFIELD_TOP + 40.0,
                        stagger: 0.4,
                    }),
                },
                ScheduleEntry {
                    trigger: WaveTrigger::WaveCleared,
                    spawn: SpawnKind::Boss,
                },
            ],
            boss: Self::default_boss(),
            powerups: Vec::new(),
            filler_spawns: true,
        }
    }

    pub fn default_boss() -> BossSpec {
        BossSpec {
            max_hp:         1500,
            radius:         56.0,
            contact_damage: 30,
            shot_damage:    12,
            score:          5000,
            phases: vec![
                BossPhaseSpec {
                    enter_below:     1.0,
                    attack:          BossAttack::Targeted,
                    motion:          BossMotion::Hover,
                    attack_interval: 1.2,
                    entry_invuln:    0.0,
                },
                BossPhaseSpec {
                    enter_below:     0.6,
                    attack:          BossAttack::Spiral,
                    motion:          BossMotion::Sweep,
                    attack_interval: 0.8,
                    entry_invuln:    1.0,
                },
                BossPhaseSpec {
                    enter_below:     0.3,
                    attack:          BossAttack::Radial,
                    motion:          BossMotion::Sweep,
                    attack_interval: 0.6,
                    entry_invuln:    1.0,
                },
            ],
        }
    }

    /// kind のスタックポリシー（設定で上書きされていなければデフォルト）
    pub fn policy_for(&self, kind: PowerupKind) -> StackPolicy {
        self.powerups
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.policy)
            .unwrap_or_else(|| kind.default_policy())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity_cap < 2 {
            return Err(ConfigError::TinyEntityCap);
        }

        // 時刻トリガは非減少でなければならない（挿入順 = シーケンス順）
        let mut last_time = f32::NEG_INFINITY;
        for (index, entry) in self.schedule.iter().enumerate() {
            if let WaveTrigger::AtTime(t) = entry.trigger {
                if t < last_time {
                    return Err(ConfigError::UnsortedSchedule { index });
                }
                last_time = t;
            }
            if let SpawnKind::Formation(spec) = &entry.spawn {
                if spec.count == 0 {
                    return Err(ConfigError::EmptyFormation { index });
                }
                if spec.stagger < 0.0 {
                    return Err(ConfigError::NegativeStagger { index });
                }
            }
        }

        // ボスフェーズ: 先頭は満タン、しきい値は狭義単調減少
        let phases = &self.boss.phases;
        if phases.is_empty() {
            return Err(ConfigError::NoBossPhases);
        }
        if (phases[0].enter_below - 1.0).abs() > f32::EPSILON {
            return Err(ConfigError::FirstPhaseNotFull);
        }
        for index in 1..phases.len() {
            if phases[index].enter_below >= phases[index - 1].enter_below {
                return Err(ConfigError::PhaseOrder { index });
            }
        }

        // パワーアップ表: 重複なし、数値は正
        for (i, entry) in self.powerups.iter().enumerate() {
            if self.powerups[..i].iter().any(|e| e.kind == entry.kind) {
                return Err(ConfigError::DuplicatePolicy { kind: entry.kind });
            }
        }
        for kind in ALL_POWERUP_KINDS {
            match self.policy_for(kind) {
                StackPolicy::Refresh { duration } if duration <= 0.0 => {
                    return Err(ConfigError::BadDuration { kind });
                }
                StackPolicy::Stack { cap, .. } if cap == 0 => {
                    return Err(ConfigError::ZeroCap { kind });
                }
                _ => {}
            }
        }

        Ok(())
    }
}
