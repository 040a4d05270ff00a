//! Tick behavior against a simulated construct.

use rstest::rstest;
use tank_core::{DriveGroup, EngineCfg, Tank, TankError};
use tank_hardware::{LockCalls, SimConstruct, SimLog, SimPanel};
use tank_traits::ConstructId;

const OWN: ConstructId = ConstructId(1);

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn build(grid: &SimConstruct) -> Tank {
    Tank::builder()
        .with_directory(grid.clone())
        .build()
        .expect("build")
}

#[test]
fn left_lever_drives_left_rotor() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Left", 45.0);
    let rotor = grid.add_rotor("Tank Drive Left");
    let log = SimLog::new();
    let mut tank = Tank::builder()
        .with_directory(grid.clone())
        .with_log(log.clone())
        .build()
        .expect("build");

    let report = tank.tick().expect("tick");

    assert!(close(rotor.rpm(), 45.0), "rpm = {}", rotor.rpm());
    assert_eq!(report.total_writes(), 1);
    assert_eq!(report.writes_for(DriveGroup::Left), 1);
    assert_eq!(
        log.last().as_deref(),
        Some("Tank Drive Left @ 0.00rpm\nLeft @ 45.0°\n\tTarget Speed: 45.00rpm\n")
    );
}

#[test]
fn left_lever_at_45_degrees_drives_both_rotors() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Left", 45.0);
    let front = grid.add_rotor("Tank Drive Left");
    let rear = grid.add_rotor("Tank Drive Left Rear");
    let surface = SimPanel::new("Tank Controller", OWN);
    let log = SimLog::new();
    let mut tank = Tank::builder()
        .with_directory(grid.clone())
        .with_surface(surface.clone())
        .with_log(log.clone())
        .build()
        .expect("build");

    let report = tank.tick().expect("tick");

    assert_eq!(tank.gear_ratio(), 1.0);
    assert!(close(front.rpm(), 45.0), "front rpm = {}", front.rpm());
    assert!(close(rear.rpm(), 45.0), "rear rpm = {}", rear.rpm());
    assert_eq!(report.writes_for(DriveGroup::Left), 2);
    assert_eq!(report.status.left, "Left @ 45.0°\n\tTarget Speed: 45.00rpm\n");
    let expected = "Tank Drive Left @ 0.00rpm\n\
                    Tank Drive Left Rear @ 0.00rpm\n\
                    Left @ 45.0°\n\tTarget Speed: 45.00rpm\n";
    assert_eq!(surface.text(), expected);
    assert_eq!(log.last().as_deref(), Some(expected));
}

#[test]
fn gear_lever_scales_drive_speed_in_the_same_tick() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Left", 30.0);
    grid.add_hinge("Tank Control Gear", 18.0);
    let rotor = grid.add_rotor("Tank Drive Left");
    let mut tank = build(&grid);

    let report = tank.tick().expect("tick");

    assert!(close(tank.gear_ratio(), 0.36));
    assert!(close(rotor.rpm(), 10.8), "rpm = {}", rotor.rpm());
    assert!(report.status.gear.starts_with("Gear 18.0°\n\tGear Ratio: x 0.36"));
    assert!(report.status.left.contains("Target Speed: 10.80rpm"));
}

#[test]
fn unchanged_speed_is_not_rewritten() {
    let mut grid = SimConstruct::new(OWN);
    let lever = grid.add_hinge("Tank Control Left", 20.0);
    let rotor = grid.add_rotor("Tank Drive Left");
    let mut tank = build(&grid);

    assert_eq!(tank.tick().expect("tick 1").total_writes(), 1);
    let second = tank.tick().expect("tick 2");
    assert_eq!(second.total_writes(), 0);
    assert!(second.status.writes.is_empty());
    assert_eq!(rotor.writes(), 1);

    lever.set_angle_deg(25.0);
    let third = tank.tick().expect("tick 3");
    assert_eq!(third.total_writes(), 1);
    assert_eq!(rotor.writes(), 2);
    assert!(third.status.writes.starts_with("Tank Drive Left @ 20.00rpm"));
}

#[test]
fn gear_change_alone_rewrites_drive_speed() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Left", 40.0);
    let gear = grid.add_hinge("Tank Control Gear", 50.0);
    let rotor = grid.add_rotor("Tank Drive Left");
    let mut tank = build(&grid);

    tank.tick().expect("tick 1");
    assert!(close(rotor.rpm(), 40.0));

    gear.set_angle_deg(25.0);
    let report = tank.tick().expect("tick 2");
    assert_eq!(report.total_writes(), 1);
    assert!(close(rotor.rpm(), 20.0));
}

#[test]
fn lever_at_rest_is_released_on_every_tick() {
    let mut grid = SimConstruct::new(OWN);
    let lever = grid.add_hinge("Tank Control Left", 0.0);
    let rotor = grid.add_rotor("Tank Drive Left");
    let mut tank = build(&grid);

    let report = tank.tick().expect("tick 1");
    assert!(report.levers[0].unlocked);
    assert!(!lever.is_enabled());
    assert_eq!(lever.limits_deg(), (-90.0, 90.0));
    assert_eq!(lever.lock_calls().set_enabled, 1);
    assert_eq!(rotor.writes(), 1);
    assert_eq!(rotor.rpm(), 0.0);

    lever.power_on();
    let report = tank.tick().expect("tick 2");
    assert!(report.levers[0].unlocked);
    assert!(!lever.is_enabled());
    assert_eq!(rotor.writes(), 1);
    assert_eq!(lever.lock_calls().set_enabled, 2);
}

#[rstest]
#[case("Tank Control Left Right")]
#[case("Tank Control Gear Left")]
#[case("Tank Control Gear Left Right")]
fn multi_role_lever_is_released_once_per_tick(#[case] name: &str) {
    let mut grid = SimConstruct::new(OWN);
    let lever = grid.add_hinge(name, 0.0);
    grid.add_rotor("Tank Drive Left");
    grid.add_rotor("Tank Drive Right");
    let mut tank = build(&grid);

    let report = tank.tick().expect("tick 1");
    assert!(report.levers.len() > 1);
    assert_eq!(report.levers.iter().filter(|l| l.unlocked).count(), 1);
    assert_eq!(
        lever.lock_calls(),
        LockCalls {
            set_enabled: 1,
            set_lower_limit: 1,
            set_upper_limit: 1,
        }
    );

    tank.tick().expect("tick 2");
    assert_eq!(
        lever.lock_calls(),
        LockCalls {
            set_enabled: 2,
            set_lower_limit: 2,
            set_upper_limit: 2,
        }
    );
}

#[test]
fn lever_off_zero_keeps_its_lock() {
    let mut grid = SimConstruct::new(OWN);
    let lever = grid.add_hinge("Tank Control Left", 2.0);
    let mut tank = build(&grid);

    let report = tank.tick().expect("tick");
    assert!(!report.levers[0].unlocked);
    assert!(lever.is_enabled());
    assert_eq!(lever.limits_deg(), (-45.0, 45.0));
}

#[test]
fn unlock_uses_configured_limit() {
    let mut grid = SimConstruct::new(OWN);
    let lever = grid.add_hinge("Tank Control Gear", 0.0);
    let mut tank = Tank::builder()
        .with_directory(grid.clone())
        .with_engine(EngineCfg {
            unlock_limit_deg: 60.0,
            ..EngineCfg::default()
        })
        .build()
        .expect("build");

    tank.tick().expect("tick");
    assert_eq!(lever.limits_deg(), (-60.0, 60.0));
}

#[rstest]
#[case(4.9, 0.0)]
#[case(-4.9, 0.0)]
#[case(5.5, 5.5)]
#[case(-30.0, -30.0)]
fn deadzone_applies_to_drive_levers(#[case] angle: f32, #[case] expected: f32) {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Left", angle);
    let rotor = grid.add_rotor("Tank Drive Left");
    let mut tank = build(&grid);

    tank.tick().expect("tick");
    assert!(close(rotor.rpm(), expected), "rpm = {}", rotor.rpm());
}

#[test]
fn gear_line_shows_the_angle_before_deadzone() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Gear", 3.0);
    let mut tank = build(&grid);

    let report = tank.tick().expect("tick");
    assert_eq!(report.status.gear, "Gear 3.0°\n\tGear Ratio: x 0.00\n");
    assert_eq!(tank.gear_ratio(), 0.0);
}

#[rstest]
#[case("Tank Control Right Reversed", 30.0, -30.0)]
#[case("Reversed Right Control Tank", -30.0, 30.0)]
#[case("Tank Control Right Unreversed", 30.0, 30.0)]
fn reversed_tag_inverts_speed(#[case] name: &str, #[case] angle: f32, #[case] rpm: f32) {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge(name, angle);
    let rotor = grid.add_rotor("Tank Drive Right");
    let mut tank = build(&grid);

    tank.tick().expect("tick");
    assert!(close(rotor.rpm(), rpm), "rpm = {}", rotor.rpm());
}

#[test]
fn reversed_gear_lever_inverts_ratio() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Gear Reversed", 50.0);
    grid.add_hinge("Tank Control Left", 10.0);
    let rotor = grid.add_rotor("Tank Drive Left");
    let mut tank = build(&grid);

    tank.tick().expect("tick");
    assert!(close(tank.gear_ratio(), -1.0));
    assert!(close(rotor.rpm(), -10.0));
}

#[test]
fn angles_past_half_turn_are_folded() {
    let mut grid = SimConstruct::new(OWN);
    let lever = grid.add_hinge("Tank Control Left", 0.0);
    lever.set_angle_rad(3.0 * std::f32::consts::PI / 2.0);
    let rotor = grid.add_rotor("Tank Drive Left");
    let mut tank = build(&grid);

    let report = tank.tick().expect("tick");
    assert!(close(report.levers[0].raw_angle_deg, -90.0));
    assert!(close(rotor.rpm(), -90.0));
}

#[test]
fn every_rotor_of_the_pool_is_commanded() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Left", 30.0);
    grid.add_hinge("Tank Control Right", 60.0);
    let l1 = grid.add_rotor("Tank Drive Left");
    let l2 = grid.add_rotor("Tank Drive Left Rear");
    let r1 = grid.add_rotor("Tank Drive Right");
    let mut tank = build(&grid);

    let report = tank.tick().expect("tick");
    assert_eq!(report.writes_for(DriveGroup::Left), 2);
    assert_eq!(report.writes_for(DriveGroup::Right), 1);
    assert!(close(l1.rpm(), 30.0) && close(l2.rpm(), 30.0));
    assert!(close(r1.rpm(), 60.0));
}

#[test]
fn levers_of_one_side_share_the_pool() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Left", 30.0);
    grid.add_hinge("Tank Control Left Aux", 10.0);
    let rotor = grid.add_rotor("Tank Drive Left");
    let mut tank = build(&grid);

    let report = tank.tick().expect("tick");
    assert_eq!(report.writes_for(DriveGroup::Left), 2);
    assert_eq!(rotor.writes(), 2);
    // Registry order: the later lever's write sticks.
    assert!(close(rotor.rpm(), 10.0));
}

#[test]
fn displays_get_their_channel_blocks() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Left", 45.0);
    grid.add_hinge("Tank Control Right", -45.0);
    grid.add_hinge("Tank Control Gear", 50.0);
    grid.add_rotor("Tank Drive Left");
    let all = grid.add_panel("Tank LCD");
    let gear_only = grid.add_panel("Tank LCD Gear");
    let right_gear = grid.add_panel("Tank LCD Gear Right");
    let surface = SimPanel::new("controller", OWN);
    let mut tank = Tank::builder()
        .with_directory(grid.clone())
        .with_surface(surface.clone())
        .build()
        .expect("build");

    let report = tank.tick().expect("tick");
    let s = &report.status;

    assert_eq!(all.text(), s.combined());
    assert_eq!(gear_only.text(), s.gear);
    assert_eq!(right_gear.text(), format!("{}{}", s.right, s.gear));
    assert_eq!(surface.text(), s.combined());
    assert!(all.text().starts_with("Tank Drive Left @ 0.00rpm\nLeft @ 45.0°"));
}

#[test]
fn displays_are_replaced_each_tick() {
    let mut grid = SimConstruct::new(OWN);
    let lever = grid.add_hinge("Tank Control Left", 45.0);
    let lcd = grid.add_panel("Tank LCD Left");
    let mut tank = build(&grid);

    tank.tick().expect("tick 1");
    lever.set_angle_deg(-20.0);
    tank.tick().expect("tick 2");
    assert_eq!(lcd.text(), "Left @ -20.0°\n\tTarget Speed: -20.00rpm\n");
}

#[test]
fn foreign_devices_are_ignored() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Left", 30.0);
    grid.add_hinge_in(ConstructId(2), "Tank Control Left", 80.0);
    let own_rotor = grid.add_rotor("Tank Drive Left");
    let foreign_rotor = grid.add_rotor_in(ConstructId(2), "Tank Drive Left");
    let mut tank = build(&grid);

    assert_eq!(tank.registry().levers().len(), 1);
    assert_eq!(tank.discovery().foreign_ignored, 2);
    tank.tick().expect("tick");
    assert!(close(own_rotor.rpm(), 30.0));
    assert_eq!(foreign_rotor.writes(), 0);
}

#[test]
fn no_levers_means_empty_ticks() {
    let mut grid = SimConstruct::new(OWN);
    let rotor = grid.add_rotor("Tank Drive Left");
    let lcd = grid.add_panel("Tank LCD");
    let mut tank = build(&grid);

    assert!(tank.registry().is_inert());
    let report = tank.tick().expect("tick");
    assert!(report.levers.is_empty());
    assert_eq!(rotor.writes(), 0);
    assert_eq!(lcd.text(), "");
    assert_eq!(tank.ticks(), 1);
}

#[test]
fn detached_rotor_fails_the_tick_with_typed_error() {
    let mut grid = SimConstruct::new(OWN);
    grid.add_hinge("Tank Control Left", 30.0);
    let rotor = grid.add_rotor("Tank Drive Left");
    let mut tank = build(&grid);
    rotor.detach();

    let err = tank.tick().expect_err("detached rotor");
    let typed = err
        .chain()
        .find_map(|e| e.downcast_ref::<TankError>())
        .expect("typed error in chain");
    assert!(matches!(typed, TankError::Detached(name) if name == "Tank Drive Left"));
    assert!(format!("{err:#}").contains("Tank Control Left"));
    assert_eq!(tank.ticks(), 0);
}

#[test]
fn lever_without_drives_only_reports() {
    let mut grid = SimConstruct::new(OWN);
    let lever = grid.add_hinge("Tank Control Left", 30.0);
    let mut tank = build(&grid);

    let report = tank.tick().expect("tick");
    assert_eq!(report.total_writes(), 0);
    assert!(report.status.left.contains("Target Speed: 30.00rpm"));
    assert_eq!(
        tank.registry().levers()[0].last_commanded(),
        Some(report.levers[0].output)
    );

    lever.detach();
    let err = tank.tick().expect_err("detached lever");
    assert!(
        err.chain()
            .any(|e| matches!(e.downcast_ref::<TankError>(), Some(TankError::Detached(_))))
    );
}
