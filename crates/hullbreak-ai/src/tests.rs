#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use hullbreak_core::constants::*;
    use hullbreak_core::enums::{BehaviorKind, Faction, FormationLayout};
    use hullbreak_core::types::{ObjectId, Transform};

    use crate::formation_registry::{Formation, FormationRegistry};
    use crate::formations::*;
    use crate::fsm::*;
    use crate::profiles::{get_profile, BehaviorProfile};
    use crate::steering::*;
    use crate::targeting::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn kin(position: DVec2) -> Kinematics {
        Kinematics {
            position,
            velocity: DVec2::ZERO,
            thrust_dir: DVec2::new(0.0, -1.0),
        }
    }

    fn target_at(id: u32, position: DVec2) -> TargetInfo {
        TargetInfo {
            id: ObjectId(id),
            position,
            velocity: DVec2::ZERO,
        }
    }

    fn context(profile: &BehaviorProfile) -> AiContext<'_> {
        AiContext {
            dt: DT,
            me: kin(DVec2::ZERO),
            profile,
            hunter: false,
            world_half_size: 10_000.0,
            shield_active: false,
            colliding: false,
            player: None,
            nearest_enemy: None,
            target: None,
            formation: None,
        }
    }

    fn leader(state: AiStateKind, target: Option<ObjectId>) -> LeaderInfo {
        LeaderInfo {
            transform: Transform::at(DVec2::new(500.0, 0.0)),
            state,
            target,
        }
    }

    // ---- Steering ----

    #[test]
    fn test_angle_diff_wraps() {
        let d = angle_diff(0.1, std::f64::consts::TAU - 0.1);
        assert!((d + 0.2).abs() < 1e-9);
        assert!((angle_diff(0.0, std::f64::consts::PI) - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_approach_thrusts_when_aligned() {
        let k = kin(DVec2::ZERO);
        let m = approach_target(&k, DVec2::new(0.0, -1000.0));
        assert!(m.thrust_forward);
        assert!(!m.rotate_left && !m.rotate_right);
    }

    #[test]
    fn test_approach_turns_before_thrusting() {
        let k = kin(DVec2::ZERO);
        let m = approach_target(&k, DVec2::new(0.0, 1000.0));
        assert!(!m.thrust_forward);
        assert!(m.rotate_left || m.rotate_right);
    }

    #[test]
    fn test_approach_brakes_on_arrival() {
        let mut k = kin(DVec2::ZERO);
        k.velocity = DVec2::new(0.0, -50.0);
        let m = approach_target(&k, DVec2::new(0.0, -50.0));
        assert!(m.brake);
        assert!(!m.thrust_forward);
    }

    #[test]
    fn test_lead_target_stationary_is_exact() {
        let aim = lead_target(DVec2::ZERO, DVec2::new(100.0, 0.0), DVec2::ZERO, 400.0);
        assert!((aim - DVec2::new(100.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_lead_target_leads_moving_target() {
        let aim = lead_target(
            DVec2::ZERO,
            DVec2::new(1000.0, 0.0),
            DVec2::new(0.0, 100.0),
            400.0,
        );
        assert!(aim.y > 0.0, "aim should lead along target velocity");
    }

    #[test]
    fn test_net_thrust_direction() {
        // Two engines at rotation 0 push along local -y.
        let dir = net_thrust_direction(0.0, [(0.0, 5.0), (0.0, 5.0)]);
        assert!((dir - DVec2::new(0.0, -1.0)).length() < 1e-9);
        assert_eq!(net_thrust_direction(0.0, std::iter::empty()), DVec2::ZERO);
    }

    // ---- Targeting ----

    fn candidate(id: u32, faction: Faction, x: f64) -> TargetCandidate {
        TargetCandidate {
            id: ObjectId(id),
            faction,
            position: DVec2::new(x, 0.0),
            velocity: DVec2::ZERO,
            invulnerable: false,
        }
    }

    #[test]
    fn test_nearest_skips_friendly_and_neutral() {
        let seeker = Seeker {
            id: ObjectId(1),
            faction: Faction::Enemy,
            position: DVec2::ZERO,
        };
        let list = vec![
            candidate(2, Faction::Enemy, 10.0),
            candidate(3, Faction::Neutral, 20.0),
            candidate(4, Faction::Player, 500.0),
            candidate(5, Faction::Player, 300.0),
        ];
        let found = find_nearest_target(&seeker, 1000.0, &list).map(|c| c.id);
        assert_eq!(found, Some(ObjectId(5)));
        let far = find_farthest_target(&seeker, 1000.0, &list).map(|c| c.id);
        assert_eq!(far, Some(ObjectId(4)));
    }

    #[test]
    fn test_targeting_respects_range_and_invulnerability() {
        let seeker = Seeker {
            id: ObjectId(1),
            faction: Faction::Enemy,
            position: DVec2::ZERO,
        };
        let mut shielded = candidate(2, Faction::Player, 100.0);
        shielded.invulnerable = true;
        let list = vec![shielded, candidate(3, Faction::Player, 5000.0)];
        assert!(find_nearest_target(&seeker, 1000.0, &list).is_none());
        assert!(find_random_target(&seeker, 1000.0, &list, &mut rng()).is_none());
    }

    #[test]
    fn test_neutral_seeker_never_targets() {
        let seeker = Seeker {
            id: ObjectId(1),
            faction: Faction::Neutral,
            position: DVec2::ZERO,
        };
        let list = vec![candidate(2, Faction::Player, 10.0)];
        assert!(find_nearest_target(&seeker, 1000.0, &list).is_none());
    }

    // ---- Profiles ----

    #[test]
    fn test_profiles() {
        assert!(get_profile(BehaviorKind::Siege).stationary);
        assert_eq!(
            AiState::initial_for(&get_profile(BehaviorKind::Siege)),
            AiState::Idle
        );
        assert_eq!(
            AiState::initial_for(&get_profile(BehaviorKind::Default)),
            AiState::patrol()
        );
    }

    // ---- State machine ----

    #[test]
    fn test_patrol_picks_target_inside_world() {
        let profile = BehaviorProfile::default();
        let mut ctx = context(&profile);
        ctx.me = kin(DVec2::new(9_500.0, 9_500.0));
        let mut state = AiState::patrol();
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(update.transition, Transition::Stay);
        let AiState::Patrol {
            target: Some(goal), ..
        } = state
        else {
            panic!("patrol target not chosen");
        };
        let limit = ctx.world_half_size - PATROL_EDGE_MARGIN;
        assert!(goal.x.abs() <= limit && goal.y.abs() <= limit);
        assert!(!update.intent.weapons.fire_primary);
    }

    #[test]
    fn test_patrol_dwells_then_repicks() {
        let profile = BehaviorProfile::default();
        let ctx = context(&profile);
        let start = DVec2::new(10.0, 0.0);
        let mut state = AiState::Patrol {
            target: Some(start),
            dwell: 0.0,
        };
        let mut r = rng();
        let mut ticks = 0;
        while matches!(state, AiState::Patrol { target: Some(t), .. } if t == start) {
            let update = evaluate(&mut state, &ctx, &mut r);
            assert!(update.intent.movement.brake, "dwelling ship holds position");
            ticks += 1;
            assert!(ticks < 1000, "patrol never moved on");
        }
        let dwelt = ticks as f64 * DT;
        assert!(dwelt >= PATROL_DWELL_SECS && dwelt < PATROL_DWELL_SECS + 3.0 * DT);
    }

    #[test]
    fn test_patrol_sees_enemy_and_seeks() {
        let profile = BehaviorProfile::default();
        let mut ctx = context(&profile);
        ctx.nearest_enemy = Some(target_at(9, DVec2::new(2000.0, 0.0)));
        let mut state = AiState::patrol();
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(update.transition, Transition::To(AiState::seek(ObjectId(9))));
    }

    #[test]
    fn test_hunter_rebases_on_player() {
        let profile = BehaviorProfile::default();
        let mut ctx = context(&profile);
        ctx.hunter = true;
        ctx.player = Some(target_at(1, DVec2::new(50_000.0, 0.0)));
        let mut state = AiState::patrol();
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(update.transition, Transition::Rebase(AiState::seek(ObjectId(1))));
    }

    #[test]
    fn test_seek_enters_attack_in_range() {
        let profile = BehaviorProfile::default();
        let mut ctx = context(&profile);
        ctx.target = Some(target_at(3, DVec2::new(0.0, -ENGAGEMENT_RANGE + 1.0)));
        let mut state = AiState::seek(ObjectId(3));
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(update.transition, Transition::To(AiState::attack(ObjectId(3))));
        assert!(!update.intent.weapons.fire_primary);
    }

    #[test]
    fn test_seek_lost_target_returns_to_initial() {
        let profile = BehaviorProfile::default();
        let ctx = context(&profile);
        let mut state = AiState::seek(ObjectId(3));
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(update.transition, Transition::ToInitial);
    }

    #[test]
    fn test_orbit_attack_fires_and_disengages() {
        let profile = get_profile(BehaviorKind::Default);
        let mut ctx = context(&profile);
        ctx.target = Some(target_at(3, DVec2::new(500.0, 0.0)));
        let mut state = AiState::attack(ObjectId(3));
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert!(update.intent.weapons.fire_primary);
        assert_eq!(update.transition, Transition::Stay);

        ctx.target = Some(target_at(3, DVec2::new(DISENGAGE_RANGE + 10.0, 0.0)));
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(update.transition, Transition::To(AiState::seek(ObjectId(3))));
    }

    #[test]
    fn test_ram_attack_switches_to_orbit_on_contact() {
        let profile = get_profile(BehaviorKind::Ramming);
        let mut ctx = context(&profile);
        ctx.target = Some(target_at(3, DVec2::new(0.0, -400.0)));

        let mut state = AiState::attack(ObjectId(3));
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert!(update.intent.utility.toggle_shields, "ramming wants shields up");
        assert!(!update.intent.weapons.fire_primary);

        ctx.shield_active = true;
        ctx.colliding = true;
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert!(matches!(
            state,
            AiState::Attack {
                phase: RamPhase::Orbiting,
                ..
            }
        ));
        assert!(update.intent.utility.toggle_shields, "orbiting drops shields");

        ctx.colliding = false;
        let ticks = (RAM_ORBIT_DURATION_SECS / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            evaluate(&mut state, &ctx, &mut rng());
        }
        assert!(matches!(
            state,
            AiState::Attack {
                phase: RamPhase::Ramming,
                ..
            }
        ));
    }

    #[test]
    fn test_idle_station_engages_in_range() {
        let profile = get_profile(BehaviorKind::Siege);
        let mut ctx = context(&profile);
        ctx.nearest_enemy = Some(target_at(4, DVec2::new(STATION_ATTACK_RANGE + 100.0, 0.0)));
        let mut state = AiState::Idle;
        assert_eq!(
            evaluate(&mut state, &ctx, &mut rng()).transition,
            Transition::Stay
        );

        ctx.nearest_enemy = Some(target_at(4, DVec2::new(STATION_ATTACK_RANGE - 100.0, 0.0)));
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(
            update.transition,
            Transition::To(AiState::SpaceStationAttack {
                target: ObjectId(4)
            })
        );
        assert!(update.intent.movement.brake);
    }

    #[test]
    fn test_station_attack_fires_and_returns_to_idle() {
        let profile = get_profile(BehaviorKind::Siege);
        let mut ctx = context(&profile);
        let mut state = AiState::SpaceStationAttack {
            target: ObjectId(4),
        };
        ctx.target = Some(target_at(4, DVec2::new(800.0, 0.0)));
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert!(update.intent.weapons.fire_primary);
        assert!(!update.intent.movement.thrust_forward);

        ctx.target = None;
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(update.transition, Transition::To(AiState::Idle));
    }

    #[test]
    fn test_formation_follower_holds_slot() {
        let profile = BehaviorProfile::default();
        let mut ctx = context(&profile);
        ctx.formation = Some(FormationView {
            offset: Some(DVec2::new(0.0, 1000.0)),
            leader: Some(leader(AiStateKind::Patrol, None)),
        });
        let view = ctx.formation.as_ref().and_then(|f| f.slot());
        assert_eq!(view, Some(DVec2::new(500.0, 1000.0)));

        let mut state = AiState::Formation;
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(update.transition, Transition::Stay);
        assert_eq!(update.intent.weapons.aim_at, DVec2::new(500.0, 0.0));
    }

    #[test]
    fn test_formation_slot_rotates_with_leader() {
        let mut transform = Transform::at(DVec2::ZERO);
        transform.rotation = std::f64::consts::FRAC_PI_2;
        let view = FormationView {
            offset: Some(DVec2::new(100.0, 0.0)),
            leader: Some(LeaderInfo {
                transform,
                state: AiStateKind::Patrol,
                target: None,
            }),
        };
        let slot = view.slot().unwrap();
        assert!((slot - DVec2::new(0.0, 100.0)).length() < 1e-9);
    }

    #[test]
    fn test_formation_follows_leader_into_combat() {
        let profile = BehaviorProfile::default();
        let mut ctx = context(&profile);
        ctx.formation = Some(FormationView {
            offset: Some(DVec2::new(1000.0, 0.0)),
            leader: Some(leader(AiStateKind::SeekTarget, Some(ObjectId(8)))),
        });
        let mut state = AiState::Formation;
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(
            update.transition,
            Transition::To(AiState::FormationSeekTarget {
                target: ObjectId(8)
            })
        );

        let mut state = AiState::FormationSeekTarget {
            target: ObjectId(8),
        };
        ctx.target = Some(target_at(8, DVec2::new(600.0, 0.0)));
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(
            update.transition,
            Transition::To(AiState::FormationAttack {
                target: ObjectId(8)
            })
        );

        let mut state = AiState::FormationAttack {
            target: ObjectId(8),
        };
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert!(update.intent.weapons.fire_primary);
        assert!(update.intent.utility.toggle_shields);
    }

    #[test]
    fn test_leader_loss_reported() {
        let profile = BehaviorProfile::default();
        let mut ctx = context(&profile);
        ctx.formation = Some(FormationView {
            offset: Some(DVec2::new(1000.0, 0.0)),
            leader: None,
        });
        for mut state in [
            AiState::Formation,
            AiState::FormationSeekTarget {
                target: ObjectId(8),
            },
            AiState::FormationAttack {
                target: ObjectId(8),
            },
        ] {
            let update = evaluate(&mut state, &ctx, &mut rng());
            assert_eq!(update.transition, Transition::FormationLost);
        }
    }

    #[test]
    fn test_formation_attack_lost_target_regroups() {
        let profile = BehaviorProfile::default();
        let mut ctx = context(&profile);
        ctx.formation = Some(FormationView {
            offset: Some(DVec2::new(1000.0, 0.0)),
            leader: Some(leader(AiStateKind::Attack, Some(ObjectId(8)))),
        });
        let mut state = AiState::FormationAttack {
            target: ObjectId(8),
        };
        let update = evaluate(&mut state, &ctx, &mut rng());
        assert_eq!(update.transition, Transition::To(AiState::Formation));
    }

    #[test]
    fn test_shield_toggle_only_when_state_differs() {
        let profile = get_profile(BehaviorKind::Default);
        let mut ctx = context(&profile);
        ctx.target = Some(target_at(3, DVec2::new(500.0, 0.0)));
        let mut state = AiState::attack(ObjectId(3));
        assert!(!evaluate(&mut state, &ctx, &mut rng()).intent.utility.toggle_shields);
        ctx.shield_active = true;
        assert!(evaluate(&mut state, &ctx, &mut rng()).intent.utility.toggle_shields);
    }

    // ---- Formations ----

    #[test]
    fn test_box_offsets() {
        let entry = box_formation("ship3", ["s", "s", "s", "s"], FormationAffixes::default(), 1000.0);
        assert_eq!(entry.layout.len(), 4);
        assert_eq!(entry.layout[0], DVec2::new(-1000.0, -1000.0));
        assert_eq!(entry.layout[3], DVec2::new(1000.0, 1000.0));
        assert_eq!(entry.followers.len(), entry.layout.len());
        assert_eq!(entry.count, 1);
    }

    #[test]
    fn test_wedges_nest() {
        let small = layout_offsets(FormationLayout::SmallWedge, 100.0);
        let large = layout_offsets(FormationLayout::LargeWedge, 100.0);
        assert_eq!(small.len(), 2);
        assert_eq!(large.len(), 6);
        assert_eq!(&large[..2], &small[..]);
    }

    #[test]
    fn test_every_layout_matches_arity() {
        for layout in FormationLayout::ALL {
            let ids = vec!["s"; follower_count(layout)];
            let entry = build_formation(layout, "lead", &ids, FormationAffixes::default(), 500.0)
                .expect("arity matches");
            assert_eq!(entry.layout.len(), entry.followers.len());
        }
    }

    #[test]
    fn test_build_formation_rejects_wrong_arity() {
        let err = build_formation(
            FormationLayout::Line,
            "lead",
            &["a", "b"],
            FormationAffixes::default(),
            1000.0,
        );
        assert!(matches!(
            err,
            Err(hullbreak_core::Error::FormationArity {
                expected: 6,
                got: 2,
                ..
            })
        ));
        assert!(build_formation_by_tag("pyramid", "l", &[], FormationAffixes::default(), 1.0).is_err());
    }

    #[test]
    fn test_prefab_affixes_apply_to_all_followers() {
        let affixes = FormationAffixes {
            leader: None,
            followers: Some(hullbreak_core::affixes::ShipAffixes {
                fire_rate_multi: Some(2.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let entry = small_wedge_formation("lead", ["a", "b"], affixes, 1000.0);
        assert!(entry.followers.iter().all(|f| f.affixes.fire_rate() == 2.0));
        assert_eq!(entry.leader.affixes.fire_rate(), 1.0);
        assert!(!entry.un_cullable);
        assert!(!entry.leader.hunter);
    }

    #[test]
    fn test_prefab_flags_reach_the_entry() {
        let affixes = FormationAffixes {
            uncullable: true,
            leader_is_hunter: true,
            ..Default::default()
        };
        let entry = box_formation("lead", ["a", "b", "c", "d"], affixes, 500.0);
        assert!(entry.un_cullable);
        assert!(entry.leader.hunter);

        let built = build_formation(FormationLayout::Diamond, "lead", &["a", "b", "c", "d"], affixes, 500.0).unwrap();
        assert!(built.un_cullable);
        assert!(built.leader.hunter);
    }

    // ---- Formation registry ----

    #[test]
    fn test_registry_lookup_and_remove() {
        let mut registry = FormationRegistry::new();
        let id = registry.allocate_id("escort");
        registry.register(Formation {
            formation_id: id.clone(),
            leader_id: ObjectId(1),
            members: vec![(ObjectId(2), DVec2::new(10.0, 0.0))],
        });
        assert_eq!(registry.leader_for_ship(ObjectId(2)), Some(ObjectId(1)));
        assert_eq!(registry.leader_for_ship(ObjectId(1)), Some(ObjectId(1)));
        assert_eq!(registry.offset_for_ship(ObjectId(1)), None);
        assert_eq!(registry.offset_for_ship(ObjectId(2)), Some(DVec2::new(10.0, 0.0)));
        assert!(registry.formation_for_ship(ObjectId(3)).is_none());

        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_allocated_ids_are_unique() {
        let mut registry = FormationRegistry::new();
        let a = registry.allocate_id("box");
        let b = registry.allocate_id("box");
        assert_ne!(a, b);
    }
}
